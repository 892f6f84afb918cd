//! Page geometry and layout calculations
//!
//! Pure calculations with no PDF access: rectangles, affine matrices,
//! N-up placement and booklet ordering.

mod booklet;
mod matrix;
mod nup;
mod rect;

pub use booklet::booklet_shuffle;
pub use matrix::{Matrix, format_number};
pub use nup::{NupPageEdit, NupParameters, NupState, SUPPORTED_NUP};
pub use rect::PageRect;
