//! Shared constants for page imposition
//!
//! This module centralizes magic numbers used by the layout and rendering code.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Default Page Box
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

/// Default printable area: left, bottom, right, top
pub const DEFAULT_PRINTABLE_AREA: (f32, f32, f32, f32) = (18.0, 36.0, 594.0, 756.0);

// =============================================================================
// Scaling Policy
// =============================================================================

/// Pages up to this many percent larger than the target still count as fitting
pub const OVERSIZE_TOLERANCE_PERCENT: i64 = 2;

// =============================================================================
// Borders
// =============================================================================

/// Line width of thin borders (points)
pub const BORDER_THIN_WIDTH: f64 = 0.24;

/// Line width of thick borders (points)
pub const BORDER_THICK_WIDTH: f64 = 0.5;

/// Gap between the page edge and the border (points)
pub const BORDER_MARGIN: f64 = 2.25;

/// Extra inset of the second line of a double border (points)
pub const BORDER_DOUBLE_GAP: f64 = 2.0;

// =============================================================================
// Page Labels
// =============================================================================

/// Resource name of the label font
pub const LABEL_FONT_NAME: &str = "pagelabel-font";

/// Label font size (points)
pub const LABEL_FONT_SIZE: f64 = 12.0;

/// Padding around the label text (points)
pub const LABEL_MARGIN: f64 = 2.25;
