//! Sets of half-open page-number intervals
//!
//! Used for both the input page selection and the output page filter.
//! Intervals are appended unsorted and normalized once by [`IntervalSet::finish`].

use crate::types::{ImposeError, Result};

/// Upper bound of an interval that never ends
pub const NPOS: u32 = u32::MAX;

/// Half-open range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<Interval>", into = "Vec<Interval>")
)]
pub struct IntervalSet {
    data: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A finished set containing every value from `start` upward
    pub fn from_start(start: u32) -> Self {
        let mut set = Self::new();
        set.add_single(start);
        set.finish();
        set
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append `[start, end)`. Empty ranges are dropped.
    pub fn add(&mut self, start: u32, end: u32) {
        if start < end {
            self.data.push(Interval { start, end });
        }
    }

    /// Append `[start, ∞)`
    pub fn add_single(&mut self, start: u32) {
        self.add(start, NPOS);
    }

    /// Sort and merge overlapping or touching intervals.
    pub fn finish(&mut self) {
        if self.data.is_empty() {
            return;
        }
        self.data.sort_unstable();

        let mut merged: Vec<Interval> = Vec::with_capacity(self.data.len());
        for cur in self.data.drain(..) {
            match merged.last_mut() {
                Some(prev) if prev.end >= cur.start => prev.end = prev.end.max(cur.end),
                _ => merged.push(cur),
            }
        }
        self.data = merged;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.data
    }

    pub fn contains(&self, val: u32) -> bool {
        self.data.iter().any(|iv| iv.start <= val && val < iv.end)
    }

    /// Smallest member greater than `val`, or `None` when there is none.
    ///
    /// The set must be finished.
    pub fn next(&self, val: u32) -> Option<u32> {
        let val = val.checked_add(1)?;
        let idx = self.data.partition_point(|iv| iv.start <= val);
        if idx > 0 && val < self.data[idx - 1].end {
            return Some(val);
        }
        self.data.get(idx).map(|iv| iv.start)
    }

    /// Parse a page-range list such as `1-3,5,8-`.
    ///
    /// `-4` means pages 1 to 4 and `8-` runs to the end of the document.
    /// The returned set is finished.
    pub fn parse_ranges(ranges: &str) -> Result<Self> {
        let mut set = Self::new();
        for part in ranges.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (lower, upper) = match part.split_once('-') {
                Some((lo, hi)) => {
                    let lower = if lo.trim().is_empty() {
                        1
                    } else {
                        parse_page_number(lo)?
                    };
                    let upper = if hi.trim().is_empty() {
                        None
                    } else {
                        Some(parse_page_number(hi)?)
                    };
                    (lower, upper)
                }
                None => {
                    let page = parse_page_number(part)?;
                    (page, Some(page))
                }
            };
            match upper {
                Some(upper) if upper < lower => {
                    return Err(ImposeError::Config(format!(
                        "Page range {} runs backwards",
                        part
                    )));
                }
                Some(upper) => set.add(lower, upper.saturating_add(1)),
                None => set.add_single(lower),
            }
        }
        set.finish();
        Ok(set)
    }

    /// Debug-log the intervals
    pub fn dump(&self, name: &str) {
        if self.data.is_empty() {
            log::debug!("{}: (none)", name);
            return;
        }
        let parts: Vec<String> = self
            .data
            .iter()
            .map(|iv| {
                if iv.end == NPOS {
                    format!("[{},inf)", iv.start)
                } else {
                    format!("[{},{})", iv.start, iv.end)
                }
            })
            .collect();
        log::debug!("{}: {}", name, parts.join(" "));
    }
}

impl From<Vec<Interval>> for IntervalSet {
    fn from(data: Vec<Interval>) -> Self {
        let mut set = Self::new();
        for iv in data {
            set.add(iv.start, iv.end);
        }
        set.finish();
        set
    }
}

impl From<IntervalSet> for Vec<Interval> {
    fn from(set: IntervalSet) -> Self {
        set.data
    }
}

fn parse_page_number(text: &str) -> Result<u32> {
    let page: u32 = text
        .trim()
        .parse()
        .map_err(|_| ImposeError::Config(format!("Invalid page number: {}", text.trim())))?;
    if page == 0 {
        return Err(ImposeError::Config("Page numbers start at 1".to_string()));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlapping_and_disjoint() {
        let mut set = IntervalSet::new();
        set.add(1, 3);
        set.add(2, 5);
        set.add(10, 12);
        set.finish();

        assert_eq!(
            set.intervals(),
            &[
                Interval { start: 1, end: 5 },
                Interval { start: 10, end: 12 }
            ]
        );
        assert!(set.contains(4));
        assert!(!set.contains(5));
        assert_eq!(set.next(4), Some(10));
    }

    #[test]
    fn test_touching_intervals_merge() {
        let mut set = IntervalSet::new();
        set.add(5, 8);
        set.add(1, 5);
        set.finish();
        assert_eq!(set.intervals(), &[Interval { start: 1, end: 8 }]);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut set = IntervalSet::new();
        set.add(7, 9);
        set.add(1, 4);
        set.add(3, 6);
        set.finish();
        let once = set.clone();
        set.finish();
        assert_eq!(set, once);
    }

    #[test]
    fn test_empty_ranges_are_dropped() {
        let mut set = IntervalSet::new();
        set.add(4, 4);
        set.add(6, 2);
        set.finish();
        assert!(set.is_empty());
        assert!(!set.contains(4));
        assert_eq!(set.next(0), None);
    }

    #[test]
    fn test_next_steps_through_gaps() {
        let mut set = IntervalSet::new();
        set.add(1, 3);
        set.add(6, 7);
        set.finish();

        assert_eq!(set.next(0), Some(1));
        assert_eq!(set.next(1), Some(2));
        assert_eq!(set.next(2), Some(6));
        assert_eq!(set.next(4), Some(6));
        assert_eq!(set.next(6), None);
    }

    #[test]
    fn test_unbounded_interval() {
        let set = IntervalSet::from_start(3);
        assert!(!set.contains(2));
        assert!(set.contains(3));
        assert!(set.contains(1_000_000));
        assert_eq!(set.next(10), Some(11));
    }

    #[test]
    fn test_parse_ranges() {
        let set = IntervalSet::parse_ranges("1-3, 5,8-").unwrap();
        assert_eq!(
            set.intervals(),
            &[
                Interval { start: 1, end: 4 },
                Interval { start: 5, end: 6 },
                Interval {
                    start: 8,
                    end: NPOS
                }
            ]
        );

        let leading = IntervalSet::parse_ranges("-2").unwrap();
        assert!(leading.contains(1));
        assert!(leading.contains(2));
        assert!(!leading.contains(3));
    }

    #[test]
    fn test_parse_ranges_rejects_garbage() {
        assert!(IntervalSet::parse_ranges("a-b").is_err());
        assert!(IntervalSet::parse_ranges("0").is_err());
        assert!(IntervalSet::parse_ranges("5-2").is_err());
    }
}
