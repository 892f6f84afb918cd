use lopdf::ObjectId;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImposeError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to impose")]
    NoPages,
    #[error("Printing is not permitted for this document")]
    PermissionDenied,
    #[error("Missing page object {0:?}")]
    MissingObject(ObjectId),
    #[error("Operation not supported on this page: {0}")]
    InvalidOperation(&'static str),
    #[error("Job cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ImposeError>;

/// Page rotation in quarter turns, counter-clockwise.
///
/// Arithmetic wraps modulo four turns, so the values never leave the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    Rot0,
    Rot90,
    Rot180,
    Rot270,
}

impl Rotation {
    /// Build a rotation from a (possibly negative) number of quarter turns
    pub fn from_quarter_turns(turns: i32) -> Self {
        match turns.rem_euclid(4) {
            0 => Rotation::Rot0,
            1 => Rotation::Rot90,
            2 => Rotation::Rot180,
            _ => Rotation::Rot270,
        }
    }

    pub fn quarter_turns(self) -> i32 {
        match self {
            Rotation::Rot0 => 0,
            Rotation::Rot90 => 1,
            Rotation::Rot180 => 2,
            Rotation::Rot270 => 3,
        }
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() * 90
    }

    /// Map counter-clockwise degrees (multiples of 90) to a rotation
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Self::from_quarter_turns(degrees / 90))
    }

    /// True for 90° and 270°
    pub fn is_quarter(self) -> bool {
        matches!(self, Rotation::Rot90 | Rotation::Rot270)
    }
}

impl Add for Rotation {
    type Output = Rotation;

    fn add(self, rhs: Rotation) -> Rotation {
        Rotation::from_quarter_turns(self.quarter_turns() + rhs.quarter_turns())
    }
}

impl Sub for Rotation {
    type Output = Rotation;

    fn sub(self, rhs: Rotation) -> Rotation {
        Rotation::from_quarter_turns(self.quarter_turns() - rhs.quarter_turns())
    }
}

impl Neg for Rotation {
    type Output = Rotation;

    fn neg(self) -> Rotation {
        Rotation::from_quarter_turns(-self.quarter_turns())
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} deg", self.degrees())
    }
}

/// Placement along one axis.
///
/// `Start` is left on the x axis and bottom on the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    Start,
    #[default]
    Center,
    End,
}

impl Position {
    pub const LEFT: Position = Position::Start;
    pub const BOTTOM: Position = Position::Start;
    pub const RIGHT: Position = Position::End;
    pub const TOP: Position = Position::End;

    /// -1, 0 or 1
    pub fn value(self) -> i32 {
        match self {
            Position::Start => -1,
            Position::Center => 0,
            Position::End => 1,
        }
    }

    /// Offset of this alignment within `slack` free space.
    pub fn offset(self, slack: f32) -> f32 {
        slack * (self.value() + 1) as f32 / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    X,
    Y,
}

/// Border drawn around each placed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderType {
    #[default]
    None,
    OneThin,
    OneThick,
    TwoThin,
    TwoThick,
}

impl BorderType {
    pub fn is_thick(self) -> bool {
        matches!(self, BorderType::OneThick | BorderType::TwoThick)
    }

    pub fn is_double(self) -> bool {
        matches!(self, BorderType::TwoThin | BorderType::TwoThick)
    }
}

/// Booklet handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BookletMode {
    /// Pages keep their order
    #[default]
    Off,
    /// Reorder for saddle stitching and print two pages per side
    On,
    /// Reorder only; the N-up grid is left alone
    ShuffleOnly,
}

/// Requested print scaling, mapped onto the individual scaling flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrintScaling {
    /// Fit oversized documents, otherwise center without scaling; fill when no margins exist
    #[default]
    Auto,
    /// Fit oversized documents, otherwise center without scaling
    AutoFit,
    /// Scale to the printable area
    Fit,
    /// Scale to fill the page and crop the excess
    Fill,
    /// Center without scaling, crop if needed
    None,
}

/// Statistics about the imposition
#[derive(Debug, Clone, PartialEq)]
pub struct ImpositionStatistics {
    /// Pages in the input document
    pub source_pages: usize,
    /// Input pages inside the input page ranges
    pub selected_pages: usize,
    /// Cells on each output page
    pub pages_per_sheet: usize,
    /// Number of booklet signatures (if applicable)
    pub signatures: Option<usize>,
    /// Output pages before the output filter
    pub output_sheets: usize,
    /// Output pages dropped by the even/odd and page range filter
    pub skipped_sheets: usize,
    /// Blank cells and pages added for booklet and duplex padding
    pub blank_pages_added: usize,
    /// Output pages of one copy
    pub output_pages: usize,
    /// Output pages including all copies
    pub total_output_pages: usize,
}
