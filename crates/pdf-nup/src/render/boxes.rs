//! Page boxes, rotation and user units
//!
//! Reads the boundary boxes of a page dictionary with the usual fallbacks:
//! TrimBox, ArtBox and BleedBox default to the CropBox, which defaults to the
//! MediaBox.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::layout::PageRect;
use crate::types::{ImposeError, Result, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId};

// =============================================================================
// Object Access
// =============================================================================

/// The dictionary of page `id`, or `MissingObject` if there is none
pub fn page_dict(doc: &Document, id: ObjectId) -> Result<&Dictionary> {
    doc.get_dictionary(id)
        .map_err(|_| ImposeError::MissingObject(id))
}

pub fn page_dict_mut(doc: &mut Document, id: ObjectId) -> Result<&mut Dictionary> {
    doc.get_dictionary_mut(id)
        .map_err(|_| ImposeError::MissingObject(id))
}

/// Follow one level of indirection
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Extract numeric value from a PDF object
pub fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn number_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f32> {
    let obj = dict.get(key).ok()?;
    extract_number(resolve(doc, obj)?)
}

// =============================================================================
// Boxes
// =============================================================================

fn read_box(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<PageRect> {
    let obj = resolve(doc, dict.get(key).ok()?)?;
    let items = obj.as_array().ok()?;
    if items.len() != 4 {
        return None;
    }
    let mut v = [0.0f32; 4];
    for (slot, item) in v.iter_mut().zip(items) {
        *slot = extract_number(resolve(doc, item)?)?;
    }
    let rect = PageRect::new(
        v[0].min(v[2]),
        v[1].min(v[3]),
        v[0].max(v[2]),
        v[1].max(v[3]),
    );
    // an empty box would scale the page by infinity
    if !(rect.width > 0.0 && rect.height > 0.0) {
        log::warn!(
            "Ignoring empty /{} [{} {} {} {}]",
            String::from_utf8_lossy(key),
            v[0],
            v[1],
            v[2],
            v[3]
        );
        return None;
    }
    Some(rect)
}

pub fn get_media_box(doc: &Document, dict: &Dictionary) -> PageRect {
    read_box(doc, dict, b"MediaBox").unwrap_or_else(|| {
        log::warn!("Page has no usable MediaBox, assuming US Letter");
        PageRect::new(0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1)
    })
}

pub fn get_crop_box(doc: &Document, dict: &Dictionary) -> PageRect {
    read_box(doc, dict, b"CropBox").unwrap_or_else(|| get_media_box(doc, dict))
}

pub fn get_bleed_box(doc: &Document, dict: &Dictionary) -> PageRect {
    read_box(doc, dict, b"BleedBox").unwrap_or_else(|| get_crop_box(doc, dict))
}

pub fn get_trim_box(doc: &Document, dict: &Dictionary) -> PageRect {
    read_box(doc, dict, b"TrimBox").unwrap_or_else(|| get_crop_box(doc, dict))
}

pub fn get_art_box(doc: &Document, dict: &Dictionary) -> PageRect {
    read_box(doc, dict, b"ArtBox").unwrap_or_else(|| get_crop_box(doc, dict))
}

/// PDF rectangle array for `rect`
pub fn make_box(rect: &PageRect) -> Object {
    Object::Array(vec![
        Object::Real(rect.left),
        Object::Real(rect.bottom),
        Object::Real(rect.right),
        Object::Real(rect.top),
    ])
}

// =============================================================================
// Rotation and User Unit
// =============================================================================

/// Counter-clockwise rotation of a page.
///
/// `/Rotate` turns pages clockwise, so 90 maps to 270° CCW. Values that are
/// not a multiple of 90 are reported and treated as 0°.
pub fn get_rotate(doc: &Document, dict: &Dictionary) -> Rotation {
    let Some(value) = number_entry(doc, dict, b"Rotate") else {
        return Rotation::Rot0;
    };
    let value = value.rem_euclid(360.0);
    if value == 0.0 {
        Rotation::Rot0
    } else if value == 90.0 {
        Rotation::Rot270
    } else if value == 180.0 {
        Rotation::Rot180
    } else if value == 270.0 {
        Rotation::Rot90
    } else {
        log::warn!("Unexpected /Rotate value {}, using 0", value);
        Rotation::Rot0
    }
}

/// `/Rotate` value (clockwise degrees) for a counter-clockwise rotation
pub fn make_rotate(rot: Rotation) -> i64 {
    match rot {
        Rotation::Rot0 => 0,
        Rotation::Rot90 => 270,
        Rotation::Rot180 => 180,
        Rotation::Rot270 => 90,
    }
}

pub fn get_user_unit(doc: &Document, dict: &Dictionary) -> f32 {
    match number_entry(doc, dict, b"UserUnit") {
        Some(unit) if unit > 0.0 => unit,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(entries: Vec<(&str, Object)>) -> Dictionary {
        Dictionary::from_iter(entries)
    }

    fn rect_obj(values: [i64; 4]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    #[test]
    fn test_box_fallback_chain() {
        let doc = Document::with_version("1.7");
        let dict = page(vec![
            ("MediaBox", rect_obj([0, 0, 600, 800])),
            ("CropBox", rect_obj([10, 10, 590, 790])),
        ]);
        assert_eq!(get_trim_box(&doc, &dict), PageRect::new(10.0, 10.0, 590.0, 790.0));
        assert_eq!(get_art_box(&doc, &dict), PageRect::new(10.0, 10.0, 590.0, 790.0));
        assert_eq!(get_bleed_box(&doc, &dict), PageRect::new(10.0, 10.0, 590.0, 790.0));

        let media_only = page(vec![("MediaBox", rect_obj([0, 0, 600, 800]))]);
        assert_eq!(get_trim_box(&doc, &media_only), PageRect::new(0.0, 0.0, 600.0, 800.0));
    }

    #[test]
    fn test_missing_media_box_defaults_to_letter() {
        let doc = Document::with_version("1.7");
        let rect = get_trim_box(&doc, &Dictionary::new());
        assert_eq!(rect, PageRect::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_empty_boxes_fall_back() {
        let doc = Document::with_version("1.7");
        let dict = page(vec![
            ("MediaBox", rect_obj([0, 0, 600, 800])),
            ("CropBox", rect_obj([0, 0, 0, 0])),
            ("TrimBox", rect_obj([100, 100, 100, 500])),
        ]);
        assert_eq!(get_trim_box(&doc, &dict), PageRect::new(0.0, 0.0, 600.0, 800.0));

        let empty_media = page(vec![("MediaBox", rect_obj([0, 0, 0, 0]))]);
        assert_eq!(get_trim_box(&doc, &empty_media), PageRect::new(0.0, 0.0, 612.0, 792.0));
    }

    #[test]
    fn test_box_corners_are_normalized() {
        let doc = Document::with_version("1.7");
        let dict = page(vec![("MediaBox", rect_obj([600, 800, 0, 0]))]);
        assert_eq!(get_media_box(&doc, &dict), PageRect::new(0.0, 0.0, 600.0, 800.0));
    }

    #[test]
    fn test_rotate_decoding() {
        let doc = Document::with_version("1.7");
        let with_rotate = |v: i64| page(vec![("Rotate", Object::Integer(v))]);
        assert_eq!(get_rotate(&doc, &Dictionary::new()), Rotation::Rot0);
        assert_eq!(get_rotate(&doc, &with_rotate(90)), Rotation::Rot270);
        assert_eq!(get_rotate(&doc, &with_rotate(180)), Rotation::Rot180);
        assert_eq!(get_rotate(&doc, &with_rotate(270)), Rotation::Rot90);
        assert_eq!(get_rotate(&doc, &with_rotate(-90)), Rotation::Rot90);
        assert_eq!(get_rotate(&doc, &with_rotate(450)), Rotation::Rot270);
        assert_eq!(get_rotate(&doc, &with_rotate(45)), Rotation::Rot0);
    }

    #[test]
    fn test_make_rotate_inverts_get_rotate() {
        let doc = Document::with_version("1.7");
        for rot in [Rotation::Rot0, Rotation::Rot90, Rotation::Rot180, Rotation::Rot270] {
            let dict = page(vec![("Rotate", Object::Integer(make_rotate(rot)))]);
            assert_eq!(get_rotate(&doc, &dict), rot);
        }
    }

    #[test]
    fn test_user_unit_default() {
        let doc = Document::with_version("1.7");
        assert_eq!(get_user_unit(&doc, &Dictionary::new()), 1.0);
        let dict = page(vec![("UserUnit", Object::Real(2.0))]);
        assert_eq!(get_user_unit(&doc, &dict), 2.0);
    }
}
