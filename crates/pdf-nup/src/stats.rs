use crate::layout::booklet_shuffle;
use crate::options::ProcessingParameters;
use crate::types::*;

/// Predict the outcome of an imposition job on a `page_count`-page document
/// without rendering anything
pub fn calculate_statistics(
    page_count: usize,
    params: &ProcessingParameters,
) -> Result<ImpositionStatistics> {
    params.validate()?;
    if page_count == 0 {
        return Err(ImposeError::NoPages);
    }

    let selected_pages = (1..=page_count).filter(|&p| params.have_page(p)).count();

    // Booklets pad the selection to whole signatures
    let (slots, signatures) = match params.booklet {
        BookletMode::Off => (selected_pages, None),
        _ => {
            let slots = booklet_shuffle(selected_pages, params.book_signature).len();
            let signatures = match params.book_signature {
                Some(signature) => slots / signature,
                None => usize::from(slots > 0),
            };
            (slots, Some(signatures))
        }
    };

    let mut nup = params.nup.clone();
    if params.booklet == BookletMode::On {
        nup.apply_preset(2)?;
    }
    let pages_per_sheet = nup.nup();

    let output_sheets = slots.div_ceil(pages_per_sheet);
    let kept = (1..=output_sheets).filter(|&n| params.with_page(n)).count();
    let duplex_blank = usize::from(params.pads_to_even() && kept % 2 == 1);
    let output_pages = kept + duplex_blank;

    Ok(ImpositionStatistics {
        source_pages: page_count,
        selected_pages,
        pages_per_sheet,
        signatures,
        output_sheets,
        skipped_sheets: output_sheets - kept,
        blank_pages_added: (slots - selected_pages) + duplex_blank,
        output_pages,
        total_output_pages: output_pages * params.num_copies as usize,
    })
}
