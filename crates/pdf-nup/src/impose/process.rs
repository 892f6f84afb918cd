//! The imposition pass
//!
//! Walks the selected input pages in (possibly booklet-shuffled) order,
//! places each one into the current output page through the N-up cursor and
//! emits output pages as they fill up.

use super::scaling::resolve_print_scaling;
use crate::layout::{NupPageEdit, NupState, PageRect, booklet_shuffle};
use crate::options::ProcessingParameters;
use crate::processor::PdfProcessor;
use crate::render::PageHandle;
use crate::types::*;
use lopdf::Document;

/// Impose all selected pages of `proc` according to `params`.
///
/// `params` are validated first. On success the processor holds the output
/// page sequence, copies included.
pub fn process_pdf_to_pdf(proc: &mut PdfProcessor, params: &ProcessingParameters) -> Result<()> {
    process_pdf_to_pdf_with_cancel(proc, params, || false)
}

/// Like [`process_pdf_to_pdf`], but calls `poll` before every input page and
/// stops with [`ImposeError::Cancelled`] once it returns `true`. The output
/// page under construction at that point is discarded.
pub fn process_pdf_to_pdf_with_cancel<F>(
    proc: &mut PdfProcessor,
    params: &ProcessingParameters,
    mut poll: F,
) -> Result<()>
where
    F: FnMut() -> bool,
{
    params.validate()?;
    if !proc.check_print_permissions() {
        log::debug!("Not allowed to print");
        return Err(ImposeError::PermissionDenied);
    }

    let mut param = params.clone();
    param.dump();

    let dst_landscape =
        param.paper_is_landscape == matches!(param.orientation, Rotation::Rot0 | Rotation::Rot180);
    if param.paper_is_landscape {
        std::mem::swap(&mut param.nup.nup_x, &mut param.nup.nup_y);
    }
    if param.auto_rotate {
        proc.auto_rotate_all(dst_landscape, param.normal_landscape)?;
    }

    // =========================================================================
    // Page selection and order
    // =========================================================================

    let mut input: Vec<PageHandle> = proc
        .get_pages()
        .into_iter()
        .enumerate()
        .filter(|(i, _)| param.have_page(i + 1))
        .map(|(_, page)| page)
        .collect();
    let num_selected = input.len();
    log::debug!("{} of {} input pages selected", num_selected, proc.num_pages());

    let shuffle: Vec<usize> = match param.booklet {
        BookletMode::Off => (0..num_selected).collect(),
        mode => {
            let order = booklet_shuffle(num_selected, param.book_signature);
            if mode == BookletMode::On {
                param.nup.apply_preset(2)?;
            }
            order
        }
    };
    if shuffle.is_empty() {
        log::info!("No pages selected, nothing to print");
        return Ok(());
    }

    // =========================================================================
    // Scaling
    // =========================================================================

    let rects = input
        .iter()
        .map(|page| page.get_rect(proc.document()))
        .collect::<Result<Vec<_>>>()?;
    resolve_print_scaling(&mut param, &rects);

    if param.cropfit {
        param.page.left = 0.0;
        param.page.bottom = 0.0;
        param.page.right = param.page.width;
        param.page.top = param.page.height;
    }

    if param.pagesize_requested && (param.fillprint || param.cropfit) {
        for page in input.iter_mut() {
            let orientation = if page.is_landscape(proc.document())? {
                param.normal_landscape
            } else {
                Rotation::Rot0
            };
            page.crop(
                proc.document_mut(),
                &param.page,
                orientation,
                param.orientation,
                param.xpos,
                param.ypos,
                !param.cropfit,
                !param.auto_rotate,
            )?;
        }
        if param.fillprint {
            param.fitplot = true;
        }
    }

    // =========================================================================
    // Output geometry
    // =========================================================================

    if param.nup.is_single() && !param.fitplot {
        param.nup.width = param.page.width;
        param.nup.height = param.page.height;
    } else {
        param.nup.width = param.page.right - param.page.left;
        param.nup.height = param.page.top - param.page.bottom;
    }

    if param.orientation.is_quarter() {
        std::mem::swap(&mut param.nup.nup_x, &mut param.nup.nup_y);
        param.nup.landscape = !param.nup.landscape;
        param.orientation = param.orientation - param.normal_landscape;
    }

    let placed_in_margins = !param.nup.is_single() || param.fitplot;
    let (mut xpos, mut ypos) = (0.0f32, 0.0f32);
    if param.nup.landscape {
        param.orientation = param.orientation + param.normal_landscape;
        if placed_in_margins {
            xpos = param.page.height - param.page.top;
            ypos = param.page.left;
        }
        std::mem::swap(&mut param.page.width, &mut param.page.height);
        std::mem::swap(&mut param.nup.width, &mut param.nup.height);
    } else if placed_in_margins {
        xpos = param.page.left;
        ypos = param.page.bottom;
    }

    let mut nup_state = NupState::new(param.nup.clone());
    nup_state.dump();

    // =========================================================================
    // Imposition
    // =========================================================================

    // without a requested paper size, unscaled single pages keep their own size
    let follows_input = !param.pagesize_requested
        && param.cropfit
        && param.nup.is_single()
        && !param.nup.landscape;

    let mut curpage: Option<PageHandle> = None;
    let mut outputpage = 0usize;
    let mut outputno = 0usize;

    for &index in &shuffle {
        if poll() {
            log::info!("Job cancelled after {} output pages", outputno);
            return Err(ImposeError::Cancelled);
        }

        let rect = match input.get(index) {
            Some(page) => page.get_rect(proc.document())?,
            None => PageRect::new(0.0, 0.0, param.page.width, param.page.height),
        };

        if follows_input {
            param.page.width = rect.width;
            param.page.right = rect.width;
            param.page.height = rect.height;
            param.page.top = rect.height;
        }

        let (edit, sheet_complete) = nup_state.next_page(rect.width, rect.height);
        if curpage.is_none() {
            curpage = Some(proc.new_page(param.page.width, param.page.height));
            outputpage += 1;
        }

        // indices past the selection are booklet padding and stay blank
        if let (Some(out), Some(page)) = (curpage.as_mut(), input.get_mut(index)) {
            place_page(
                proc.document_mut(),
                &param,
                out,
                page,
                &rect,
                &edit,
                (xpos, ypos),
            )?;
        }

        if sheet_complete {
            if let Some(out) = curpage.take() {
                emit_page(proc, &param, out, outputpage, &mut outputno)?;
            }
        }
    }

    if let Some(out) = curpage.take() {
        emit_page(proc, &param, out, outputpage, &mut outputno)?;
    }

    if param.pads_to_even() && outputno % 2 == 1 {
        log::debug!("Adding a blank page to keep duplex sides aligned");
        let blank = proc.new_page(param.page.width, param.page.height);
        proc.add_page(blank, param.reverse)?;
    }

    proc.multiply(param.num_copies, param.collate)?;
    log::info!(
        "Imposed {} input pages onto {} output pages ({} copies)",
        num_selected,
        outputno,
        param.num_copies
    );
    Ok(())
}

/// Annotate `page` and draw it onto `out`
fn place_page(
    doc: &mut Document,
    param: &ProcessingParameters,
    out: &mut PageHandle,
    page: &mut PageHandle,
    rect: &PageRect,
    edit: &NupPageEdit,
    (xpos, ypos): (f32, f32),
) -> Result<()> {
    if param.border != BorderType::None {
        page.add_border_rect(doc, rect, param.border, 1.0 / edit.scale)?;
    }
    if let Some(label) = &param.page_label {
        page.add_label(doc, &param.page, label)?;
    }

    if param.cropfit && param.nup.is_single() {
        let paper = &param.page;
        let (x, y) = if (paper.height - paper.width) * (rect.height - rect.width) < 0.0 {
            // page and paper differ in orientation
            let xpos2 = (paper.width - rect.height) / 2.0;
            let ypos2 = (paper.height - rect.width) / 2.0;
            (ypos2 + xpos, xpos2 + ypos)
        } else {
            (
                (paper.width - rect.width) / 2.0 + xpos,
                (paper.height - rect.height) / 2.0 + ypos,
            )
        };
        out.add_subpage(doc, page, x, y, 1.0, None)
    } else {
        out.add_subpage(doc, page, edit.xpos + xpos, edit.ypos + ypos, edit.scale, None)
    }
}

/// Rotate, mirror and append a finished output page, unless the output
/// filter drops it
fn emit_page(
    proc: &mut PdfProcessor,
    param: &ProcessingParameters,
    mut page: PageHandle,
    outputpage: usize,
    outputno: &mut usize,
) -> Result<()> {
    if !param.with_page(outputpage) {
        log::debug!("Skipping output page {}", outputpage);
        return Ok(());
    }

    page.rotate(param.orientation);
    if param.mirror {
        page.mirror(proc.document_mut())?;
    }
    proc.add_page(page, param.reverse)?;

    *outputno += 1;
    if param.page_logging {
        log::info!("PAGE: {} {}", outputno, param.num_copies);
    }
    Ok(())
}
