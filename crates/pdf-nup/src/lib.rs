mod constants;
pub mod impose;
mod intervals;
pub mod layout;
mod options;
mod processor;
pub mod render;
mod stats;
mod types;

pub use constants::{POINTS_PER_MM, mm_to_pt};
pub use impose::{
    impose, impose_with_cancel, load_pdf, process_pdf_to_pdf, process_pdf_to_pdf_with_cancel,
    save_pdf,
};
pub use intervals::{Interval, IntervalSet, NPOS};
pub use layout::{NupParameters, NupState, PageRect};
pub use options::*;
pub use processor::PdfProcessor;
pub use render::PageHandle;
pub use stats::calculate_statistics;
pub use types::*;
