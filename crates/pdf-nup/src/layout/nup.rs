//! N-up layout: several input pages per output page
//!
//! [`NupParameters`] describes the grid and the order in which cells are
//! filled. [`NupState`] walks that grid one input page at a time and yields a
//! [`NupPageEdit`] telling the caller where and at which scale to place it.

use super::rect::PageRect;
use crate::types::{Axis, ImposeError, Position, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pages-per-sheet values with a clean rectangular grid
pub const SUPPORTED_NUP: [usize; 11] = [1, 2, 3, 4, 6, 8, 9, 10, 12, 15, 16];

// =============================================================================
// Parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NupParameters {
    /// Columns
    pub nup_x: usize,
    /// Rows
    pub nup_y: usize,
    /// Area shared by all cells, computed by the orchestrator
    pub width: f32,
    pub height: f32,
    /// Grid is laid out on a sheet turned by the normal landscape rotation
    pub landscape: bool,
    /// Axis that is filled first
    pub first: Axis,
    /// Edges the fill order starts from
    pub xstart: Position,
    pub ystart: Position,
    /// Alignment of a page inside its cell along the slack axis
    pub xalign: Position,
    pub yalign: Position,
}

impl Default for NupParameters {
    fn default() -> Self {
        Self {
            nup_x: 1,
            nup_y: 1,
            width: 0.0,
            height: 0.0,
            landscape: false,
            first: Axis::X,
            xstart: Position::LEFT,
            ystart: Position::TOP,
            xalign: Position::Center,
            yalign: Position::Center,
        }
    }
}

impl NupParameters {
    /// Whether `nup` pages per sheet is supported
    pub fn possible(nup: usize) -> bool {
        SUPPORTED_NUP.contains(&nup)
    }

    /// Canonical `(nup_x, nup_y, landscape)` grid for `nup` pages per sheet
    pub fn preset(nup: usize) -> Option<(usize, usize, bool)> {
        let grid = match nup {
            1 => (1, 1, false),
            2 => (2, 1, true),
            3 => (3, 1, true),
            4 => (2, 2, false),
            6 => (3, 2, true),
            8 => (4, 2, true),
            9 => (3, 3, false),
            10 => (5, 2, true),
            12 => (3, 4, false),
            15 => (5, 3, true),
            16 => (4, 4, false),
            _ => return None,
        };
        Some(grid)
    }

    /// Replace the grid with the preset for `nup`
    pub fn apply_preset(&mut self, nup: usize) -> Result<()> {
        let (nup_x, nup_y, landscape) = Self::preset(nup).ok_or_else(|| {
            ImposeError::Config(format!("{} pages per sheet is not supported", nup))
        })?;
        self.nup_x = nup_x;
        self.nup_y = nup_y;
        self.landscape = landscape;
        Ok(())
    }

    /// Parse a fill order such as `lrtb` (left to right, then top to bottom).
    ///
    /// Two direction pairs from `lr`, `rl`, `tb` and `bt`, one per axis; the first
    /// pair names the axis that is filled first.
    pub fn parse_layout(&mut self, layout: &str) -> Result<()> {
        let invalid = || ImposeError::Config(format!("Invalid N-up layout: {}", layout));

        let chars: Vec<char> = layout.chars().map(|c| c.to_ascii_lowercase()).collect();
        if chars.len() != 4 {
            return Err(invalid());
        }
        let (axis0, pos0) = parse_direction(chars[0], chars[1]).ok_or_else(invalid)?;
        let (axis1, pos1) = parse_direction(chars[2], chars[3]).ok_or_else(invalid)?;
        if axis0 == axis1 {
            return Err(invalid());
        }

        self.first = axis0;
        match axis0 {
            Axis::X => {
                self.xstart = pos0;
                self.ystart = pos1;
            }
            Axis::Y => {
                self.xstart = pos1;
                self.ystart = pos0;
            }
        }
        Ok(())
    }

    /// Number of cells per sheet
    pub fn nup(&self) -> usize {
        self.nup_x * self.nup_y
    }

    pub fn is_single(&self) -> bool {
        self.nup_x == 1 && self.nup_y == 1
    }

    pub fn dump(&self) {
        log::debug!(
            "NupX: {}, NupY: {}, width: {}, height: {}",
            self.nup_x,
            self.nup_y,
            self.width,
            self.height
        );
        log::debug!(
            "landscape: {}, first: {:?}, start: {:?}/{:?}, align: {:?}/{:?}",
            self.landscape,
            self.first,
            self.xstart,
            self.ystart,
            self.xalign,
            self.yalign
        );
    }
}

fn parse_direction(a: char, b: char) -> Option<(Axis, Position)> {
    match (a, b) {
        ('l', 'r') => Some((Axis::X, Position::LEFT)),
        ('r', 'l') => Some((Axis::X, Position::RIGHT)),
        ('t', 'b') => Some((Axis::Y, Position::TOP)),
        ('b', 't') => Some((Axis::Y, Position::BOTTOM)),
        _ => None,
    }
}

// =============================================================================
// Placement
// =============================================================================

/// Placement of one input page on its output page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NupPageEdit {
    pub xpos: f32,
    pub ypos: f32,
    pub scale: f32,
    /// The area the scaled page covers
    pub sub: PageRect,
}

/// Cursor over the cells of successive output pages
#[derive(Debug, Clone)]
pub struct NupState {
    param: NupParameters,
    in_pages: usize,
    out_pages: usize,
    nup: usize,
    subpage: usize,
}

impl NupState {
    pub fn new(param: NupParameters) -> Self {
        debug_assert!(param.nup_x > 0 && param.nup_y > 0);
        let nup = param.nup().max(1);
        Self {
            param,
            in_pages: 0,
            out_pages: 0,
            nup,
            subpage: 0,
        }
    }

    pub fn reset(&mut self) {
        self.in_pages = 0;
        self.out_pages = 0;
        self.subpage = 0;
    }

    pub fn params(&self) -> &NupParameters {
        &self.param
    }

    /// Input pages placed so far
    pub fn in_pages(&self) -> usize {
        self.in_pages
    }

    /// Output pages completed so far
    pub fn out_pages(&self) -> usize {
        self.out_pages
    }

    /// Cell the next page goes into
    pub fn subpage(&self) -> usize {
        self.subpage
    }

    /// Place the next input page.
    ///
    /// Returns the placement and whether this page filled the last cell of its
    /// output page, i.e. the output page is complete and the next page starts
    /// a new one. That happens on every `nup`-th call.
    pub fn next_page(&mut self, in_width: f32, in_height: f32) -> (NupPageEdit, bool) {
        self.in_pages += 1;

        let (subx, suby) = self.convert_order(self.subpage);
        let edit = self.calculate_edit(subx, suby, in_width, in_height);

        self.subpage += 1;
        let sheet_complete = self.subpage >= self.nup;
        if sheet_complete {
            self.subpage = 0;
            self.out_pages += 1;
        }
        (edit, sheet_complete)
    }

    /// Grid cell `(column, row)` of the `subpage`-th page on a sheet.
    ///
    /// Rows count from the bottom, columns from the left.
    pub fn convert_order(&self, subpage: usize) -> (usize, usize) {
        let nup_x = self.param.nup_x.max(1) as i64;
        let nup_y = self.param.nup_y.max(1) as i64;
        let subpage = subpage as i64;

        let (subx, suby) = match self.param.first {
            Axis::X => (subpage % nup_x, subpage / nup_x),
            Axis::Y => (subpage / nup_y, subpage % nup_y),
        };

        let xstart = self.param.xstart.value() as i64;
        let ystart = self.param.ystart.value() as i64;
        let subx = (nup_x - 1) * (xstart + 1) / 2 - xstart * subx;
        let suby = (nup_y - 1) * (ystart + 1) / 2 - ystart * suby;

        (subx.max(0) as usize, suby.max(0) as usize)
    }

    /// Fit an `in_width` × `in_height` page into cell `(subx, suby)`.
    ///
    /// The page keeps its aspect ratio; the leftover space on the axis that is
    /// not filled is distributed by `xalign`/`yalign`.
    pub fn calculate_edit(&self, subx: usize, suby: usize, in_width: f32, in_height: f32) -> NupPageEdit {
        let width = self.param.width / self.param.nup_x.max(1) as f32;
        let height = self.param.height / self.param.nup_y.max(1) as f32;

        let mut xpos = subx as f32 * width;
        let mut ypos = suby as f32 * height;

        if !(in_width > 0.0 && in_height > 0.0) {
            log::warn!(
                "Page size {}x{} is empty, placing it unscaled",
                in_width,
                in_height
            );
            return NupPageEdit {
                xpos,
                ypos,
                scale: 1.0,
                sub: PageRect::new(xpos, ypos, xpos, ypos),
            };
        }

        let scalex = width / in_width;
        let scaley = height / in_height;
        let mut subwidth = in_width * scaley;
        let mut subheight = in_height * scalex;

        let scale = if scalex > scaley {
            subheight = height;
            xpos += self.param.xalign.offset(width - subwidth);
            scaley
        } else {
            subwidth = width;
            ypos += self.param.yalign.offset(height - subheight);
            scalex
        };

        NupPageEdit {
            xpos,
            ypos,
            scale,
            sub: PageRect::new(xpos, ypos, xpos + subwidth, ypos + subheight),
        }
    }

    pub fn dump(&self) {
        log::debug!(
            "N-up state: in_pages={} out_pages={} nup={} subpage={}",
            self.in_pages,
            self.out_pages,
            self.nup,
            self.subpage
        );
        self.param.dump();
    }
}
