//! Print scaling policy
//!
//! Turns the requested scaling (possibly "auto") into exactly one of the
//! concrete modes: fit, fill or crop.

use crate::constants::OVERSIZE_TOLERANCE_PERCENT;
use crate::layout::PageRect;
use crate::options::ProcessingParameters;
use crate::types::PrintScaling;

/// Scaling the caller asked for; conflicting flags resolve by precedence and
/// no flag at all means [`PrintScaling::Auto`]
pub(crate) fn requested_scaling(param: &ProcessingParameters) -> PrintScaling {
    if param.autoprint {
        PrintScaling::Auto
    } else if param.autofit {
        PrintScaling::AutoFit
    } else if param.fitplot {
        PrintScaling::Fit
    } else if param.fillprint {
        PrintScaling::Fill
    } else if param.cropfit {
        PrintScaling::None
    } else {
        PrintScaling::Auto
    }
}

/// Whether `rect` is larger than the paper even when turned sideways
fn too_large(rect: &PageRect, param: &ProcessingParameters) -> bool {
    let factor = 100.0 / (100 + OVERSIZE_TOLERANCE_PERCENT) as f32;
    let w = (rect.width * factor).trunc();
    let h = (rect.height * factor).trunc();
    let page = &param.page;
    (w > page.width || h > page.height) && (h > page.width || w > page.height)
}

/// Decide the scaling for a job and set the matching flag in `param`.
///
/// `rects` are the visible sizes of the selected input pages. Returns the
/// resolved mode, one of `Fit`, `Fill` or `None`.
pub(crate) fn resolve_print_scaling(
    param: &mut ProcessingParameters,
    rects: &[PageRect],
) -> PrintScaling {
    let requested = requested_scaling(param);
    log::debug!("Requested print scaling: {:?}", requested);

    let resolved = match requested {
        PrintScaling::Auto | PrintScaling::AutoFit => {
            let page = &param.page;
            let margin_defined = !(page.width == page.right - page.left
                && page.height == page.top - page.bottom);

            let mut document_large = false;
            for (i, rect) in rects.iter().enumerate() {
                if too_large(rect, param) {
                    log::debug!(
                        "Page {} too large for output page size, scaling pages to fit",
                        i + 1
                    );
                    document_large = true;
                }
            }
            if param.fidelity {
                log::debug!("Fidelity requested, scaling pages to fit");
            }

            if param.fidelity || document_large {
                if requested == PrintScaling::AutoFit || margin_defined {
                    PrintScaling::Fit
                } else {
                    PrintScaling::Fill
                }
            } else {
                PrintScaling::None
            }
        }
        explicit => explicit,
    };

    param.set_print_scaling(resolved);
    log::info!(
        "Print scaling mode: {}",
        match resolved {
            PrintScaling::Fit => "scale to fit printable area",
            PrintScaling::Fill => "scale to fill page and crop",
            _ => "do not scale, center, crop if needed",
        }
    );
    resolved
}
