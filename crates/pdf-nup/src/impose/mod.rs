//! N-up, booklet and page-layout imposition
//!
//! This module runs an imposition job:
//! 1. Check print permission and select input pages
//! 2. Resolve the print scaling policy
//! 3. Place pages onto output pages through the N-up grid
//! 4. Emit, pad and multiply the output pages

mod io;
mod process;
mod scaling;

pub use io::{load_pdf, save_pdf};
pub use process::{process_pdf_to_pdf, process_pdf_to_pdf_with_cancel};

use crate::options::ProcessingParameters;
use crate::processor::PdfProcessor;
use crate::types::*;
use lopdf::Document;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Main imposition function
pub async fn impose(document: &Document, params: &ProcessingParameters) -> Result<Document> {
    impose_with_cancel(document, params, Arc::new(AtomicBool::new(false))).await
}

/// Imposition that stops with [`ImposeError::Cancelled`] once `cancel` is set
pub async fn impose_with_cancel(
    document: &Document,
    params: &ProcessingParameters,
    cancel: Arc<AtomicBool>,
) -> Result<Document> {
    params.validate()?;

    let document = document.clone();
    let params = params.clone();

    tokio::task::spawn_blocking(move || impose_sync(document, &params, &cancel)).await?
}

fn impose_sync(
    document: Document,
    params: &ProcessingParameters,
    cancel: &AtomicBool,
) -> Result<Document> {
    let mut proc = PdfProcessor::new(document)?;
    if proc.num_pages() == 0 {
        return Err(ImposeError::NoPages);
    }

    process_pdf_to_pdf_with_cancel(&mut proc, params, || cancel.load(Ordering::Relaxed))?;
    proc.into_document()
}
