//! Document store for one imposition job
//!
//! [`PdfProcessor`] owns the `lopdf` document, remembers the original pages
//! and collects the output page sequence. The page tree is only rebuilt when
//! the job is turned back into a document.

use crate::layout::PageRect;
use crate::render::{
    PageHandle, get_rotate, get_trim_box, make_rotate, page_dict, page_dict_mut, resolve,
};
use crate::types::{Result, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::io::Write;
use std::path::Path;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `Parent` chains
const MAX_TREE_DEPTH: usize = 64;

/// Print bit of the `/P` permission word
const PERMISSION_PRINT: i64 = 1 << 2;

pub struct PdfProcessor {
    doc: Document,
    orig_pages: Vec<ObjectId>,
    output: Vec<ObjectId>,
}

impl PdfProcessor {
    pub fn new(mut doc: Document) -> Result<Self> {
        let orig_pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        for &id in &orig_pages {
            push_inherited_attributes(&mut doc, id)?;
        }
        log::debug!("Loaded document with {} pages", orig_pages.len());

        Ok(Self {
            doc,
            orig_pages,
            output: Vec::new(),
        })
    }

    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        Self::new(Document::load_mem(bytes)?)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(Document::load(path)?)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn num_pages(&self) -> usize {
        self.orig_pages.len()
    }

    /// Output pages added so far, in order
    pub fn output_pages(&self) -> &[ObjectId] {
        &self.output
    }

    /// Whether the document permits printing
    pub fn check_print_permissions(&self) -> bool {
        let Ok(encrypt) = self.doc.trailer.get(b"Encrypt") else {
            return true;
        };
        let permissions = resolve(&self.doc, encrypt)
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|dict| dict.get(b"P").ok())
            .and_then(|p| p.as_i64().ok());

        match permissions {
            Some(p) => p & PERMISSION_PRINT != 0,
            None => true,
        }
    }

    /// Handles for the original pages, numbered from 1
    pub fn get_pages(&self) -> Vec<PageHandle> {
        self.orig_pages
            .iter()
            .enumerate()
            .map(|(i, &id)| PageHandle::existing(id, i + 1))
            .collect()
    }

    pub fn new_page(&mut self, width: f32, height: f32) -> PageHandle {
        PageHandle::create(&mut self.doc, width, height)
    }

    /// Finish `page` and append it to the output, or prepend with `reverse`
    pub fn add_page(&mut self, page: PageHandle, reverse: bool) -> Result<()> {
        let id = page.finish(&mut self.doc)?;
        if reverse {
            self.output.insert(0, id);
        } else {
            self.output.push(id);
        }
        Ok(())
    }

    /// Repeat the output sequence `copies` times.
    ///
    /// Collated copies repeat the whole sequence, otherwise every page is
    /// repeated in place. Copies share content and resources with the page
    /// they were made from.
    pub fn multiply(&mut self, copies: u32, collate: bool) -> Result<()> {
        if copies <= 1 {
            return Ok(());
        }
        let pages = std::mem::take(&mut self.output);
        let mut result = Vec::with_capacity(pages.len() * copies as usize);

        if collate {
            result.extend_from_slice(&pages);
            for _ in 1..copies {
                for &id in &pages {
                    result.push(self.copy_page(id)?);
                }
            }
        } else {
            for &id in &pages {
                result.push(id);
                for _ in 1..copies {
                    result.push(self.copy_page(id)?);
                }
            }
        }

        self.output = result;
        Ok(())
    }

    fn copy_page(&mut self, id: ObjectId) -> Result<ObjectId> {
        let dict = page_dict(&self.doc, id)?.clone();
        Ok(self.doc.add_object(dict))
    }

    /// Turn every original page whose orientation differs from the
    /// destination by `normal_landscape`
    pub fn auto_rotate_all(&mut self, dst_landscape: bool, normal_landscape: Rotation) -> Result<()> {
        for &id in &self.orig_pages {
            let page = page_dict(&self.doc, id)?;
            let src_rot = get_rotate(&self.doc, page);
            let trim = get_trim_box(&self.doc, page);

            let mut rect = PageRect::new(0.0, 0.0, trim.width, trim.height);
            rect.rotate_move(src_rot, trim.width, trim.height);
            let src_landscape = rect.width > rect.height;

            if src_landscape != dst_landscape {
                let rotate = make_rotate(src_rot + normal_landscape);
                log::debug!("Auto-rotating page {:?} to /Rotate {}", id, rotate);
                page_dict_mut(&mut self.doc, id)?.set("Rotate", Object::Integer(rotate));
            }
        }
        Ok(())
    }

    /// Replace the page tree with the output sequence and drop everything
    /// no longer reachable
    pub fn into_document(mut self) -> Result<Document> {
        let pages_id = self.doc.new_object_id();
        let mut kids = Vec::with_capacity(self.output.len());
        for &id in &self.output {
            page_dict_mut(&mut self.doc, id)?.set("Parent", Object::Reference(pages_id));
            kids.push(Object::Reference(id));
        }

        let count = kids.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = match self.doc.trailer.get(b"Root").and_then(Object::as_reference) {
            Ok(id) if self.doc.get_dictionary(id).is_ok() => id,
            _ => {
                let id = self.doc.add_object(Dictionary::from_iter(vec![(
                    "Type",
                    Object::Name(b"Catalog".to_vec()),
                )]));
                self.doc.trailer.set("Root", Object::Reference(id));
                id
            }
        };
        let catalog = self.doc.get_dictionary_mut(catalog_id)?;
        catalog.set("Pages", Object::Reference(pages_id));
        // labels and outlines describe the input page numbering
        catalog.remove(b"PageLabels");
        catalog.remove(b"Outlines");

        let pruned = self.doc.prune_objects();
        log::debug!(
            "Output document has {} pages, pruned {} objects",
            count,
            pruned.len()
        );
        Ok(self.doc)
    }

    /// Serialize the output document
    pub fn save_to<W: Write>(self, writer: &mut W) -> Result<()> {
        let mut doc = self.into_document()?;
        doc.save_to(writer)?;
        Ok(())
    }
}

/// Copy inherited attributes from the page tree onto the page itself
fn push_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let page = page_dict(doc, page_id)?;
    let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found: Vec<(Vec<u8>, Object)> = Vec::new();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        depth += 1;

        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    if !found.is_empty() {
        let page = page_dict_mut(doc, page_id)?;
        for (key, value) in found {
            page.set(key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::get_media_box;

    /// Two pages under one Pages node that carries the MediaBox and Rotate
    fn inherited_doc() -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..2 {
            let page_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(2)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(400),
                    Object::Integer(300),
                ]),
            ),
            ("Rotate", Object::Integer(90)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_inherited_attributes_pushed_down() {
        let proc = PdfProcessor::new(inherited_doc()).unwrap();
        assert_eq!(proc.num_pages(), 2);
        for page in proc.get_pages() {
            let dict = proc.document().get_dictionary(page.id()).unwrap();
            assert_eq!(
                get_media_box(proc.document(), dict),
                PageRect::new(0.0, 0.0, 400.0, 300.0)
            );
            assert_eq!(get_rotate(proc.document(), dict), Rotation::Rot270);
        }
    }

    #[test]
    fn test_print_permissions() {
        let mut doc = inherited_doc();
        assert!(PdfProcessor::new(doc.clone()).unwrap().check_print_permissions());

        let encrypt = doc.add_object(Dictionary::from_iter(vec![("P", Object::Integer(-3904))]));
        doc.trailer.set("Encrypt", Object::Reference(encrypt));
        assert!(!PdfProcessor::new(doc.clone()).unwrap().check_print_permissions());

        doc.objects.insert(
            encrypt,
            Object::Dictionary(Dictionary::from_iter(vec![("P", Object::Integer(-3900))])),
        );
        assert!(PdfProcessor::new(doc).unwrap().check_print_permissions());
    }

    fn with_two_output_pages() -> (PdfProcessor, ObjectId, ObjectId) {
        let mut proc = PdfProcessor::new(inherited_doc()).unwrap();
        let a = proc.new_page(100.0, 100.0);
        let b = proc.new_page(100.0, 100.0);
        let (a_id, b_id) = (a.id(), b.id());
        proc.add_page(a, false).unwrap();
        proc.add_page(b, false).unwrap();
        (proc, a_id, b_id)
    }

    #[test]
    fn test_multiply_collated() {
        let (mut proc, a_id, b_id) = with_two_output_pages();
        proc.multiply(2, true).unwrap();
        let out = proc.output_pages();
        assert_eq!(out.len(), 4);
        assert_eq!((out[0], out[1]), (a_id, b_id));
        assert!(out[2] != a_id && out[3] != b_id);

        let copy = proc.document().get_dictionary(out[2]).unwrap();
        let original = proc.document().get_dictionary(a_id).unwrap();
        assert_eq!(copy.get(b"Contents").unwrap(), original.get(b"Contents").unwrap());
    }

    #[test]
    fn test_multiply_uncollated() {
        let (mut proc, a_id, b_id) = with_two_output_pages();
        proc.multiply(3, false).unwrap();
        let out = proc.output_pages();
        assert_eq!(out.len(), 6);
        assert_eq!((out[0], out[3]), (a_id, b_id));
        assert!(out[1] != a_id && out[2] != a_id);
    }

    #[test]
    fn test_single_copy_is_unchanged() {
        let (mut proc, a_id, b_id) = with_two_output_pages();
        proc.multiply(1, false).unwrap();
        assert_eq!(proc.output_pages(), &[a_id, b_id]);
    }

    #[test]
    fn test_reverse_prepends() {
        let mut proc = PdfProcessor::new(inherited_doc()).unwrap();
        let a = proc.new_page(100.0, 100.0);
        let b = proc.new_page(100.0, 100.0);
        let (a_id, b_id) = (a.id(), b.id());
        proc.add_page(a, true).unwrap();
        proc.add_page(b, true).unwrap();
        assert_eq!(proc.output_pages(), &[b_id, a_id]);
    }

    #[test]
    fn test_auto_rotate_all() {
        let mut proc = PdfProcessor::new(inherited_doc()).unwrap();
        // 400x300 turned by /Rotate 90 is portrait
        proc.auto_rotate_all(false, Rotation::Rot270).unwrap();
        let first = proc.get_pages()[0].id();
        let dict = proc.document().get_dictionary(first).unwrap();
        assert_eq!(get_rotate(proc.document(), dict), Rotation::Rot270);

        proc.auto_rotate_all(true, Rotation::Rot270).unwrap();
        let dict = proc.document().get_dictionary(first).unwrap();
        assert_eq!(get_rotate(proc.document(), dict), Rotation::Rot180);
    }

    #[test]
    fn test_into_document_rebuilds_page_tree() {
        let mut proc = PdfProcessor::new(inherited_doc()).unwrap();
        let page = proc.new_page(200.0, 100.0);
        proc.add_page(page, false).unwrap();

        let doc = proc.into_document().unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let dict = doc.get_dictionary(pages[&1]).unwrap();
        assert_eq!(
            get_media_box(&doc, dict),
            PageRect::new(0.0, 0.0, 200.0, 100.0)
        );
    }
}
