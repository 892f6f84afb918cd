//! Content stream snippets for page borders and labels

use crate::constants::{
    BORDER_DOUBLE_GAP, BORDER_MARGIN, BORDER_THICK_WIDTH, BORDER_THIN_WIDTH, LABEL_FONT_NAME,
    LABEL_FONT_SIZE, LABEL_MARGIN,
};
use crate::layout::{PageRect, format_number as num};
use crate::types::BorderType;

/// Border box drawing commands.
///
/// `fscale` compensates for the scale the page is placed at, so line width
/// and margin come out the same size on paper.
pub fn border_commands(rect: &PageRect, border: BorderType, fscale: f64) -> String {
    if border == BorderType::None {
        return String::new();
    }

    let base_width = if border.is_thick() {
        BORDER_THICK_WIDTH
    } else {
        BORDER_THIN_WIDTH
    };
    let line_width = base_width * fscale;
    let mut margin = BORDER_MARGIN * fscale;

    let mut cmd = String::from("q\n");
    cmd.push_str(&format!("  {} w 0 G\n", num(line_width)));
    cmd.push_str(&box_path(rect, margin));
    if border.is_double() {
        margin += BORDER_DOUBLE_GAP * fscale;
        cmd.push_str(&box_path(rect, margin));
    }
    cmd.push_str("Q\n");
    cmd
}

fn box_path(rect: &PageRect, margin: f64) -> String {
    let (left, bottom) = (rect.left as f64, rect.bottom as f64);
    let (width, height) = ((rect.right - rect.left) as f64, (rect.top - rect.bottom) as f64);
    format!(
        "  {} {} {} {} re S\n",
        num(left + margin),
        num(bottom + margin),
        num(width - 2.0 * margin),
        num(height - 2.0 * margin)
    )
}

/// Label drawing commands: the text in an outlined white box at the top and
/// at the bottom of `rect`.
pub fn label_commands(rect: &PageRect, label: &str) -> String {
    let margin = LABEL_MARGIN;
    let height = LABEL_FONT_SIZE;
    let (left, bottom) = (rect.left as f64, rect.bottom as f64);
    let (right, top) = (rect.right as f64, rect.top as f64);

    let box_x = num(left + margin);
    let box_w = num(right - left - 2.0 * margin);
    let box_h = num(height + 2.0 * margin);
    let top_y = num(top - height - 2.0 * margin);
    let bottom_y = num(bottom);
    let text = escape_pdf_string(label);

    let mut cmd = String::from("q\n");
    cmd.push_str("  1 1 1 rg\n");
    cmd.push_str(&format!("  {} {} {} {} re f\n", box_x, top_y, box_w, box_h));
    cmd.push_str(&format!("  {} {} {} {} re f\n", box_x, bottom_y, box_w, box_h));
    cmd.push_str("  0 0 0 RG\n");
    cmd.push_str(&format!("  {} {} {} {} re S\n", box_x, top_y, box_w, box_h));
    cmd.push_str(&format!("  {} {} {} {} re S\n", box_x, bottom_y, box_w, box_h));
    cmd.push_str("  0 0 0 rg\n");
    for baseline in [top - height - margin, bottom + margin] {
        cmd.push_str("  BT\n");
        cmd.push_str(&format!("  /{} {} Tf\n", LABEL_FONT_NAME, num(height)));
        cmd.push_str(&format!(
            "  {} {} Td\n",
            num(left + 2.0 * margin),
            num(baseline)
        ));
        cmd.push_str(&format!("  ({}) Tj\n", text));
        cmd.push_str("  ET\n");
    }
    cmd.push_str("Q\n");
    cmd
}

/// Escape text for a literal PDF string; characters outside printable ASCII become `?`
pub fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
