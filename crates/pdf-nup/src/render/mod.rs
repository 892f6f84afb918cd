//! PDF-side operations for imposition
//!
//! This module handles everything that touches PDF objects:
//! - Reading page boxes, rotation and user units
//! - Wrapping pages into Form XObjects
//! - Page handles that crop, rotate, annotate and composite pages

mod annotate;
mod boxes;
mod page;
mod xobject;

pub use annotate::{border_commands, escape_pdf_string, label_commands};
pub use boxes::{
    get_art_box, get_bleed_box, get_crop_box, get_media_box, get_rotate, get_trim_box,
    get_user_unit, make_box, make_rotate, page_dict, page_dict_mut, resolve,
};
pub use page::PageHandle;
pub use xobject::{get_page_content, make_xobject};
