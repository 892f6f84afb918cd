use crate::constants::{DEFAULT_PAGE_DIMENSIONS, DEFAULT_PRINTABLE_AREA};
use crate::intervals::IntervalSet;
use crate::layout::{NupParameters, PageRect};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything that controls one imposition job
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProcessingParameters {
    // Copies
    pub num_copies: u32,
    pub collate: bool,

    // Scaling
    /// The paper size was chosen explicitly; otherwise output pages take the
    /// size of the input pages
    pub pagesize_requested: bool,
    pub fitplot: bool,
    pub fillprint: bool,
    pub cropfit: bool,
    pub autoprint: bool,
    pub autofit: bool,
    /// Scale to fit even when the document would fit as-is
    pub fidelity: bool,

    // Orientation
    pub orientation: Rotation,
    /// Rotation used to turn portrait content onto landscape paper
    pub normal_landscape: Rotation,
    pub paper_is_landscape: bool,
    pub auto_rotate: bool,

    /// Paper size in `width`/`height`; the edges are the printable area
    pub page: PageRect,

    // Layout
    pub nup: NupParameters,
    pub booklet: BookletMode,
    /// Pages per booklet signature; `None` puts everything in one signature
    pub book_signature: Option<usize>,
    pub xpos: Position,
    pub ypos: Position,

    // Decoration
    pub border: BorderType,
    pub page_label: Option<String>,
    pub mirror: bool,

    // Page selection
    pub even_pages: bool,
    pub odd_pages: bool,
    /// Output pages to emit, numbered from 1
    pub page_ranges: IntervalSet,
    /// Input pages to use, numbered from 1
    pub input_page_ranges: IntervalSet,

    // Output
    pub reverse: bool,
    /// Pad each copy to an even page count for duplex printing
    pub even_duplex: bool,
    /// Log a `PAGE:` line for every emitted sheet
    pub page_logging: bool,
}

impl Default for ProcessingParameters {
    fn default() -> Self {
        let (width, height) = DEFAULT_PAGE_DIMENSIONS;
        let (left, bottom, right, top) = DEFAULT_PRINTABLE_AREA;
        Self {
            num_copies: 1,
            collate: false,
            pagesize_requested: false,
            fitplot: false,
            fillprint: false,
            cropfit: false,
            autoprint: false,
            autofit: false,
            fidelity: false,
            orientation: Rotation::Rot0,
            normal_landscape: Rotation::Rot270,
            paper_is_landscape: false,
            auto_rotate: false,
            page: PageRect {
                left,
                bottom,
                right,
                top,
                width,
                height,
            },
            nup: NupParameters::default(),
            booklet: BookletMode::Off,
            book_signature: None,
            xpos: Position::Center,
            ypos: Position::Center,
            border: BorderType::None,
            page_label: None,
            mirror: false,
            even_pages: true,
            odd_pages: true,
            page_ranges: IntervalSet::from_start(1),
            input_page_ranges: IntervalSet::from_start(1),
            reverse: false,
            even_duplex: false,
            page_logging: false,
        }
    }
}

impl ProcessingParameters {
    /// Load parameters from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let params = serde_json::from_slice(&bytes)
            .map_err(|e| ImposeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(params)
    }

    /// Save parameters to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ImposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        if self.num_copies == 0 {
            return Err(ImposeError::Config("At least one copy is required".to_string()));
        }

        if self.nup.nup_x == 0 || self.nup.nup_y == 0 {
            return Err(ImposeError::Config(
                "N-up grid needs at least one row and one column".to_string(),
            ));
        }
        if !NupParameters::possible(self.nup.nup()) {
            return Err(ImposeError::Config(format!(
                "{} pages per sheet is not supported",
                self.nup.nup()
            )));
        }

        match self.book_signature {
            Some(signature) if signature == 0 || signature % 4 != 0 => {
                return Err(ImposeError::Config(format!(
                    "Booklet signature must be a positive multiple of 4, got {}",
                    signature
                )));
            }
            _ => {}
        }

        if !self.even_pages && !self.odd_pages {
            return Err(ImposeError::Config(
                "Neither even nor odd pages selected".to_string(),
            ));
        }

        let page = &self.page;
        if !(page.width > 0.0 && page.height > 0.0) {
            return Err(ImposeError::Config(format!(
                "Paper size must be positive, got {}x{}",
                page.width, page.height
            )));
        }
        if !(page.right > page.left && page.top > page.bottom) {
            return Err(ImposeError::Config(
                "Printable area is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether output page `outno` (from 1) is emitted
    pub fn with_page(&self, outno: usize) -> bool {
        let wanted = if outno % 2 == 0 {
            self.even_pages
        } else {
            self.odd_pages
        };
        wanted && self.page_ranges.contains(page_number(outno))
    }

    /// Whether input page `pageno` (from 1) is used
    pub fn have_page(&self, pageno: usize) -> bool {
        self.input_page_ranges.contains(page_number(pageno))
    }

    /// Whether an odd number of emitted pages gets a blank page appended
    pub fn pads_to_even(&self) -> bool {
        self.even_duplex || !self.odd_pages
    }

    /// Set exactly one scaling flag for `scaling`
    pub fn set_print_scaling(&mut self, scaling: PrintScaling) {
        self.autoprint = false;
        self.autofit = false;
        self.fitplot = false;
        self.fillprint = false;
        self.cropfit = false;
        match scaling {
            PrintScaling::Auto => self.autoprint = true,
            PrintScaling::AutoFit => self.autofit = true,
            PrintScaling::Fit => self.fitplot = true,
            PrintScaling::Fill => self.fillprint = true,
            PrintScaling::None => self.cropfit = true,
        }
    }

    /// Request a `width` × `height` paper with a uniform `margin` (points)
    pub fn set_page_size(&mut self, width: f32, height: f32, margin: f32) {
        self.page = PageRect {
            left: margin,
            bottom: margin,
            right: width - margin,
            top: height - margin,
            width,
            height,
        };
        self.pagesize_requested = true;
    }

    /// Debug-log every parameter
    pub fn dump(&self) {
        log::debug!("num_copies: {}, collate: {}", self.num_copies, self.collate);
        log::debug!(
            "scaling: fitplot={} fillprint={} cropfit={} autoprint={} autofit={} fidelity={}",
            self.fitplot,
            self.fillprint,
            self.cropfit,
            self.autoprint,
            self.autofit,
            self.fidelity
        );
        log::debug!(
            "orientation: {}, normal_landscape: {}, paper_is_landscape: {}, auto_rotate: {}",
            self.orientation,
            self.normal_landscape,
            self.paper_is_landscape,
            self.auto_rotate
        );
        log::debug!("pagesize_requested: {}", self.pagesize_requested);
        self.page.dump("page");
        self.nup.dump();
        log::debug!(
            "booklet: {:?}, signature: {:?}, position: {:?}/{:?}",
            self.booklet,
            self.book_signature,
            self.xpos,
            self.ypos
        );
        log::debug!(
            "border: {:?}, page_label: {:?}, mirror: {}",
            self.border,
            self.page_label,
            self.mirror
        );
        log::debug!("even_pages: {}, odd_pages: {}", self.even_pages, self.odd_pages);
        self.page_ranges.dump("page_ranges");
        self.input_page_ranges.dump("input_page_ranges");
        log::debug!(
            "reverse: {}, even_duplex: {}, page_logging: {}",
            self.reverse,
            self.even_duplex,
            self.page_logging
        );
    }
}

fn page_number(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
