//! Page handles: original pages and output pages under construction
//!
//! A [`PageHandle`] is either an `Existing` page of the input document or a
//! `New` blank page that other pages are composited onto. Every operation
//! takes the document explicitly; the handle only stores object ids and the
//! pending state of a new page.

use super::annotate::{border_commands, label_commands};
use super::boxes::{
    get_rotate, get_trim_box, get_user_unit, make_box, make_rotate, page_dict, page_dict_mut,
};
use super::xobject::make_xobject;
use crate::constants::LABEL_FONT_NAME;
use crate::layout::{Matrix, PageRect, format_number as num};
use crate::types::{BorderType, ImposeError, Position, Result, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

#[derive(Debug, Clone)]
pub enum PageHandle {
    /// Page `no` (1-based) of the input document
    Existing {
        id: ObjectId,
        no: usize,
        rotation: Rotation,
    },
    /// Blank output page; content and XObjects are written by [`PageHandle::finish`]
    New {
        id: ObjectId,
        width: f32,
        height: f32,
        content: String,
        xobjects: Dictionary,
        rotation: Rotation,
        next_xobject: usize,
    },
}

impl PageHandle {
    /// Allocate a blank `width` × `height` page in `doc`
    pub fn create(doc: &mut Document, width: f32, height: f32) -> Self {
        let id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("MediaBox", make_box(&PageRect::new(0.0, 0.0, width, height))),
            ("Resources", Object::Dictionary(Dictionary::new())),
        ]));
        PageHandle::New {
            id,
            width,
            height,
            content: String::from("q\n"),
            xobjects: Dictionary::new(),
            rotation: Rotation::Rot0,
            next_xobject: 0,
        }
    }

    pub fn existing(id: ObjectId, no: usize) -> Self {
        PageHandle::Existing {
            id,
            no,
            rotation: Rotation::Rot0,
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            PageHandle::Existing { id, .. } | PageHandle::New { id, .. } => *id,
        }
    }

    /// Rotation applied when the page is finished
    pub fn rotation(&self) -> Rotation {
        match self {
            PageHandle::Existing { rotation, .. } | PageHandle::New { rotation, .. } => *rotation,
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, PageHandle::Existing { .. })
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Visible size of the page: trim box at the origin, turned by `/Rotate`
    /// and scaled by `/UserUnit`
    pub fn get_rect(&self, doc: &Document) -> Result<PageRect> {
        page_rect(doc, self.id())
    }

    /// Whether the trim box is wider than it is tall
    pub fn is_landscape(&self, doc: &Document) -> Result<bool> {
        match self {
            PageHandle::New { width, height, .. } => Ok(width > height),
            PageHandle::Existing { id, .. } => {
                let page = page_dict(doc, *id)?;
                let trim = get_trim_box(doc, page);
                Ok(trim.width > trim.height)
            }
        }
    }

    /// Shrink the trim box to the part of the page that fits `cropped_page`.
    ///
    /// With `scale` the window keeps the aspect ratio of `cropped_page` and
    /// is as large as the page allows; without it the window has exactly the
    /// size of `cropped_page`. `xpos`/`ypos` place the window on the page.
    /// Returns the page's rotation, which is left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub fn crop(
        &mut self,
        doc: &mut Document,
        cropped_page: &PageRect,
        orientation: Rotation,
        param_orientation: Rotation,
        xpos: Position,
        ypos: Position,
        scale: bool,
        autorotate: bool,
    ) -> Result<Rotation> {
        let PageHandle::Existing { id, .. } = *self else {
            return Err(ImposeError::InvalidOperation("crop on a new page"));
        };

        let page = page_dict(doc, id)?;
        let saved_rotate = get_rotate(doc, page);
        let current = get_trim_box(doc, page);

        let page_rot = match orientation {
            Rotation::Rot0 | Rotation::Rot180 => Rotation::Rot90,
            _ => Rotation::Rot0,
        };

        let (width, height) = (current.width, current.height);
        let mut page_width = cropped_page.right - cropped_page.left;
        let mut page_height = cropped_page.top - cropped_page.bottom;

        let swap = if autorotate {
            (!page_rot.is_quarter() && page_width <= page_height)
                || (page_rot.is_quarter() && page_width > page_height)
        } else {
            param_orientation.is_quarter()
        };
        if swap {
            std::mem::swap(&mut page_width, &mut page_height);
        }

        let (final_w, final_h) = if scale {
            if width * page_height / page_width <= height {
                (width, width * page_height / page_width)
            } else {
                (height * page_width / page_height, height)
            }
        } else {
            (page_width, page_height)
        };
        log::debug!(
            "Cropping page to {}x{} out of {}x{}",
            final_w,
            final_h,
            width,
            height
        );

        let left = current.left + xpos.offset(width - final_w);
        let bottom = current.bottom + ypos.offset(height - final_h);
        let trim = PageRect::new(left, bottom, left + final_w, bottom + final_h);
        page_dict_mut(doc, id)?.set("TrimBox", make_box(&trim));

        Ok(saved_rotate)
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Compose `rot` with the rotation applied at finish
    pub fn rotate(&mut self, rot: Rotation) {
        match self {
            PageHandle::Existing { rotation, .. } | PageHandle::New { rotation, .. } => {
                *rotation = *rotation + rot;
            }
        }
    }

    /// Flip the page horizontally.
    ///
    /// An existing page is first wrapped as an XObject into a new page of the
    /// same visible size.
    pub fn mirror(&mut self, doc: &mut Document) -> Result<()> {
        if let PageHandle::Existing { id, no, rotation } = *self {
            let page = page_dict(doc, id)?;
            let turned = get_rotate(doc, page) + rotation;
            page_dict_mut(doc, id)?.set("Rotate", Object::Integer(make_rotate(turned)));

            let orig = page_rect(doc, id)?;
            let xobject = make_xobject(doc, id)?;
            let mut wrapper = PageHandle::create(doc, orig.width, orig.height);
            if let PageHandle::New {
                content, xobjects, ..
            } = &mut wrapper
            {
                let name = format!("X{}", no);
                content.push_str(&format!("  /{} Do\n", name));
                xobjects.set(name, Object::Reference(xobject));
            }
            *self = wrapper;
        }

        if let PageHandle::New { content, width, .. } = self {
            content.insert_str(0, &format!("-1 0 0 1 {} 0 cm\n", num(*width as f64)));
        }
        Ok(())
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Draw `sub` onto this page at `(xpos, ypos)` scaled by `scale`.
    ///
    /// With `crop`, only that window of `sub` is shown and its lower-left
    /// corner lands on `(xpos, ypos)`.
    pub fn add_subpage(
        &mut self,
        doc: &mut Document,
        sub: &PageHandle,
        xpos: f32,
        ypos: f32,
        scale: f32,
        crop: Option<&PageRect>,
    ) -> Result<()> {
        let PageHandle::New {
            content,
            xobjects,
            next_xobject,
            ..
        } = self
        else {
            return Err(ImposeError::InvalidOperation(
                "subpages can only be added to a new page",
            ));
        };

        let name = match sub {
            PageHandle::Existing { no, .. } => format!("X{}", no),
            PageHandle::New { .. } => {
                *next_xobject += 1;
                format!("S{}", next_xobject)
            }
        };

        if let Some(crop) = crop {
            widen_trim_box(doc, sub, crop)?;
        }
        if !sub.is_existing() {
            sub.finish(doc)?;
        }
        let xobject = make_xobject(doc, sub.id())?;
        xobjects.set(name.clone(), Object::Reference(xobject));

        let mut mtx = Matrix::identity();
        mtx.translate(xpos as f64, ypos as f64)
            .scale_uniform(scale as f64)
            .rotate(sub.rotation());

        content.push_str("q\n");
        content.push_str(&format!("  {} cm\n", mtx));
        if let Some(crop) = crop {
            content.push_str(&format!(
                "  0 0 {} {} re W n\n",
                num((crop.right - crop.left) as f64),
                num((crop.top - crop.bottom) as f64)
            ));
            content.push_str(&format!(
                "  1 0 0 1 {} {} cm\n",
                num(-crop.left as f64),
                num(-crop.bottom as f64)
            ));
        }
        content.push_str(&format!("  /{} Do\n", name));
        content.push_str("Q\n");
        Ok(())
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Draw a border around `rect`, given in [`PageHandle::get_rect`] space
    pub fn add_border_rect(
        &mut self,
        doc: &mut Document,
        rect: &PageRect,
        border: BorderType,
        fscale: f32,
    ) -> Result<()> {
        if border == BorderType::None {
            return Ok(());
        }
        match self {
            PageHandle::Existing { id, .. } => {
                let id = *id;
                let rotation = get_rotate(doc, page_dict(doc, id)?);
                let raw = unget_rect(doc, id, rect, rotation)?;
                let cmd = border_commands(&raw, border, fscale as f64);
                add_page_contents(doc, id, cmd.into_bytes(), true)
            }
            PageHandle::New { content, .. } => {
                content.push_str(&border_commands(rect, border, fscale as f64));
                Ok(())
            }
        }
    }

    /// Print `label` at the top and bottom of `rect`
    pub fn add_label(&mut self, doc: &mut Document, rect: &PageRect, label: &str) -> Result<()> {
        match self {
            PageHandle::Existing { id, .. } => {
                let id = *id;
                let rotation = get_rotate(doc, page_dict(doc, id)?);
                let raw = unget_rect(doc, id, rect, rotation)?;
                add_label_font(doc, id)?;
                add_page_contents(doc, id, b"q\n".to_vec(), true)?;
                let mut cmd = String::from("Q\n");
                cmd.push_str(&label_commands(&raw, label));
                add_page_contents(doc, id, cmd.into_bytes(), false)
            }
            PageHandle::New { id, content, .. } => {
                add_label_font(doc, *id)?;
                content.push_str(&label_commands(rect, label));
                Ok(())
            }
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Write pending state into the page object and return its id.
    ///
    /// New pages get their content stream and XObject resources; both kinds
    /// get `/Rotate` updated with the accumulated rotation.
    pub fn finish(&self, doc: &mut Document) -> Result<ObjectId> {
        match self {
            PageHandle::Existing { id, rotation, .. } => {
                if *rotation != Rotation::Rot0 {
                    let turned = get_rotate(doc, page_dict(doc, *id)?) + *rotation;
                    page_dict_mut(doc, *id)?.set("Rotate", Object::Integer(make_rotate(turned)));
                }
                Ok(*id)
            }
            PageHandle::New {
                id,
                content,
                xobjects,
                rotation,
                ..
            } => {
                let mut data = content.clone().into_bytes();
                data.extend_from_slice(b"Q\n");
                let content_id = doc.add_object(Stream::new(Dictionary::new(), data));

                let page = page_dict(doc, *id)?;
                let (res_ref, mut resources) = take_dict(doc, page.get(b"Resources").ok())?;
                if !xobjects.is_empty() {
                    let (xo_ref, mut xo) = take_dict(doc, resources.get(b"XObject").ok())?;
                    for (name, obj) in xobjects.iter() {
                        xo.set(name.clone(), obj.clone());
                    }
                    resources.set("XObject", store_dict(doc, xo_ref, xo));
                }
                let resources = store_dict(doc, res_ref, resources);

                let page = page_dict_mut(doc, *id)?;
                page.set("Contents", Object::Reference(content_id));
                page.set("Resources", resources);
                page.set("Rotate", Object::Integer(make_rotate(*rotation)));
                Ok(*id)
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn page_rect(doc: &Document, id: ObjectId) -> Result<PageRect> {
    let page = page_dict(doc, id)?;
    let trim = get_trim_box(doc, page);
    let mut rect = PageRect::new(0.0, 0.0, trim.width, trim.height);
    rect.rotate_move(get_rotate(doc, page), trim.width, trim.height);
    rect.scale(get_user_unit(doc, page));
    Ok(rect)
}

/// Map `rect` from [`PageHandle::get_rect`] space back into raw page space
fn unget_rect(doc: &Document, id: ObjectId, rect: &PageRect, rotation: Rotation) -> Result<PageRect> {
    let visible = page_rect(doc, id)?;
    let page = page_dict(doc, id)?;
    let trim = get_trim_box(doc, page);

    let mut raw = *rect;
    raw.rotate_move(-rotation, visible.width, visible.height);
    raw.scale(1.0 / get_user_unit(doc, page));
    raw.translate(trim.left, trim.bottom);
    Ok(raw)
}

/// Grow the trim box of `sub` so a crop window of `crop`'s size fits in it
fn widen_trim_box(doc: &mut Document, sub: &PageHandle, crop: &PageRect) -> Result<()> {
    let id = sub.id();
    let mut visible = page_rect(doc, id)?;
    let rotation = get_rotate(doc, page_dict(doc, id)?);

    let mut window = PageRect::new(0.0, 0.0, crop.right - crop.left, crop.top - crop.bottom);
    window.rotate_move(-rotation, window.width, window.height);
    if visible.width < window.width {
        visible.right = visible.left + window.width;
    }
    if visible.height < window.height {
        visible.top = visible.bottom + window.height;
    }

    let raw = unget_rect(doc, id, &visible, Rotation::Rot0)?;
    page_dict_mut(doc, id)?.set("TrimBox", make_box(&raw));
    Ok(())
}

/// Dictionary behind `obj`, with the reference it was stored under
fn take_dict(doc: &Document, obj: Option<&Object>) -> Result<(Option<ObjectId>, Dictionary)> {
    match obj {
        Some(Object::Reference(id)) => Ok((Some(*id), doc.get_dictionary(*id)?.clone())),
        Some(Object::Dictionary(dict)) => Ok((None, dict.clone())),
        _ => Ok((None, Dictionary::new())),
    }
}

/// Write back a dictionary obtained from [`take_dict`]; returns the value
/// the parent should hold
fn store_dict(doc: &mut Document, reference: Option<ObjectId>, dict: Dictionary) -> Object {
    match reference {
        Some(id) => {
            doc.objects.insert(id, Object::Dictionary(dict));
            Object::Reference(id)
        }
        None => Object::Dictionary(dict),
    }
}

fn add_label_font(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));

    let page = page_dict(doc, page_id)?;
    let (res_ref, mut resources) = take_dict(doc, page.get(b"Resources").ok())?;
    let (font_ref, mut fonts) = take_dict(doc, resources.get(b"Font").ok())?;
    fonts.set(LABEL_FONT_NAME, Object::Reference(font_id));
    resources.set("Font", store_dict(doc, font_ref, fonts));
    let resources = store_dict(doc, res_ref, resources);
    page_dict_mut(doc, page_id)?.set("Resources", resources);
    Ok(())
}

/// Add a content stream before (`first`) or after the page's existing ones
fn add_page_contents(doc: &mut Document, page_id: ObjectId, data: Vec<u8>, first: bool) -> Result<()> {
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), data));

    let page = page_dict(doc, page_id)?;
    let mut streams = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    if first {
        streams.insert(0, Object::Reference(stream_id));
    } else {
        streams.push(Object::Reference(stream_id));
    }
    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(streams));
    Ok(())
}
