//! XObject creation for imposition
//!
//! This module handles creating Form XObjects from pages, which are then
//! placed onto output pages with transformations.

use super::boxes::{get_rotate, get_trim_box, get_user_unit, make_box, page_dict};
use crate::layout::{Matrix, PageRect};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject showing page `page_id` upright.
///
/// The form is clipped to the page's trim box and its matrix applies the
/// page's `/Rotate` and `/UserUnit`, so the form's lower-left corner sits at
/// the origin and its size matches the page's rotated, scaled trim box.
///
/// # Arguments
/// * `doc` - The document holding the page; the XObject is added to it
/// * `page_id` - The object ID of the page
pub fn make_xobject(doc: &mut Document, page_id: ObjectId) -> Result<ObjectId> {
    let page = page_dict(doc, page_id)?;

    let bbox = get_trim_box(doc, page);
    let rotation = get_rotate(doc, page);
    let user_unit = get_user_unit(doc, page);

    // Where the rotated box would land, so it can be moved back to the origin
    let mut corner = PageRect::new(0.0, 0.0, 0.0, 0.0);
    corner.rotate_move(rotation, bbox.width, bbox.height);

    let mut matrix = Matrix::identity();
    matrix
        .scale_uniform(user_unit as f64)
        .translate(corner.left as f64, corner.bottom as f64)
        .rotate(rotation)
        .translate(-bbox.left as f64, -bbox.bottom as f64);

    let resources = page.get(b"Resources").ok().cloned();
    let group = page.get(b"Group").ok().cloned();
    let content = get_page_content(doc, page)?;

    Ok(add_form_xobject(doc, &bbox, &matrix, resources, group, content))
}

/// Add a Form XObject stream to the document
pub fn add_form_xobject(
    doc: &mut Document,
    bbox: &PageRect,
    matrix: &Matrix,
    resources: Option<Object>,
    group: Option<Object>,
    content: Vec<u8>,
) -> ObjectId {
    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set("BBox", make_box(bbox));
    xobject_dict.set("Matrix", matrix_object(matrix));
    if let Some(resources) = resources {
        xobject_dict.set("Resources", resources);
    }
    if let Some(group) = group {
        xobject_dict.set("Group", group);
    }

    doc.add_object(Stream::new(xobject_dict, content))
}

/// PDF array for a transformation matrix
pub fn matrix_object(matrix: &Matrix) -> Object {
    Object::Array(
        matrix
            .as_array()
            .iter()
            .map(|v| Object::Real(*v as f32))
            .collect(),
    )
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the content stream data from a page.
pub fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            _ => get_single_content_stream(doc, *id),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

/// Get content from a single content stream reference
fn get_single_content_stream(doc: &Document, id: ObjectId) -> Result<Vec<u8>> {
    if let Ok(stream) = doc.get_object(id)?.as_stream() {
        let mut content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        content.push(b'\n');
        Ok(content)
    } else {
        Ok(Vec::new())
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            result.extend(get_single_content_stream(doc, *id)?);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(doc: &mut Document, rotate: i64) -> ObjectId {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"0 0 m 10 10 l S".to_vec()));
        doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(200),
                    Object::Integer(300),
                ]),
            ),
            ("Rotate", Object::Integer(rotate)),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]))
    }

    fn xobject_matrix(doc: &Document, id: ObjectId) -> Vec<f32> {
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        stream
            .dict
            .get(b"Matrix")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| extract(o))
            .collect()
    }

    fn extract(obj: &Object) -> f32 {
        match obj {
            Object::Real(r) => *r,
            Object::Integer(i) => *i as f32,
            _ => panic!("not a number"),
        }
    }

    #[test]
    fn test_unrotated_page_has_identity_matrix() {
        let mut doc = Document::with_version("1.7");
        let page = page_with(&mut doc, 0);
        let xobject = make_xobject(&mut doc, page).unwrap();

        assert_eq!(xobject_matrix(&doc, xobject), vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let stream = doc.get_object(xobject).unwrap().as_stream().unwrap();
        assert_eq!(stream.content, b"0 0 m 10 10 l S\n".to_vec());
        assert!(stream.dict.get(b"Resources").is_ok());
    }

    #[test]
    fn test_rotated_page_lands_in_positive_quadrant() {
        let mut doc = Document::with_version("1.7");
        // /Rotate 90 turns the page clockwise: 200x300 becomes 300x200
        let page = page_with(&mut doc, 90);
        let xobject = make_xobject(&mut doc, page).unwrap();
        let m = xobject_matrix(&doc, xobject);
        let apply = |x: f32, y: f32| (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5]);

        // turned clockwise: top-left goes to top-right, bottom-right to the origin
        assert_eq!(apply(0.0, 300.0), (300.0, 200.0));
        assert_eq!(apply(200.0, 0.0), (0.0, 0.0));
        assert_eq!(apply(0.0, 0.0), (0.0, 200.0));
    }
}
