//! Pixel index ranges and partitions.
//!
//! A [`PixelRange`] is a half-open interval `[start, end)` over the pixel
//! indices of a planar buffer. A [`Partition`] is an ordered sequence of
//! ranges which, once [validated](Partition::validate), is guaranteed to cover
//! `[0, pixel_count)` exactly once: no gaps, no overlaps, nothing past the end.
//!
//! # Example
//!
//! ```rust
//! use overlay_core::{Partition, PixelRange};
//!
//! let part = Partition::from_ranges(vec![
//!     PixelRange::new(0, 4),
//!     PixelRange::new(4, 10),
//! ]);
//! assert!(part.validate(10).is_ok());
//! assert!(part.validate(12).is_err()); // [10, 12) left uncovered
//! ```

use std::ops::Range;

use crate::error::{Error, Result};

/// Half-open pixel index interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRange {
    /// First index in the range
    pub start: usize,
    /// One past the last index
    pub end: usize,
}

impl PixelRange {
    /// Creates a new range.
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range starting at `start` spanning `len` pixels.
    #[inline]
    pub const fn with_len(start: usize, len: usize) -> Self {
        Self { start, end: start + len }
    }

    /// Number of pixels in the range (zero for inverted ranges).
    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range holds no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` if `index` lies inside the range.
    #[inline]
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// The range as a `std::ops::Range` for slicing.
    #[inline]
    pub const fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for PixelRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Ordered sequence of pixel ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    ranges: Vec<PixelRange>,
}

impl Partition {
    /// Wraps a list of ranges. Call [`validate`](Self::validate) before use.
    pub fn from_ranges(ranges: Vec<PixelRange>) -> Self {
        Self { ranges }
    }

    /// The ranges in order.
    #[inline]
    pub fn ranges(&self) -> &[PixelRange] {
        &self.ranges
    }

    /// Number of ranges, including empty ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if there are no ranges at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates over the ranges.
    pub fn iter(&self) -> std::slice::Iter<'_, PixelRange> {
        self.ranges.iter()
    }

    /// Total number of pixels covered.
    pub fn covered(&self) -> usize {
        self.ranges.iter().map(PixelRange::len).sum()
    }

    /// Checks that the ranges tile `[0, pixel_count)` in order.
    ///
    /// Each range must start where the previous one ended (the first at 0),
    /// must not be inverted, must not end past `pixel_count`, and the last
    /// range must end at `pixel_count`. Empty ranges are allowed anywhere as
    /// long as they sit on the running boundary.
    pub fn validate(&self, pixel_count: usize) -> Result<()> {
        let invalid = |reason: String| Error::InvalidPartition { pixel_count, reason };

        let mut cursor = 0usize;
        for (i, range) in self.ranges.iter().enumerate() {
            if range.end < range.start {
                return Err(invalid(format!("range {i} {range} is inverted")));
            }
            if range.end > pixel_count {
                return Err(invalid(format!("range {i} {range} ends out of bounds")));
            }
            if range.start > cursor {
                return Err(invalid(format!(
                    "gap [{cursor}, {}) before range {i}",
                    range.start
                )));
            }
            if range.start < cursor {
                return Err(invalid(format!(
                    "range {i} {range} overlaps previous coverage up to {cursor}"
                )));
            }
            cursor = range.end;
        }

        if cursor != pixel_count {
            return Err(invalid(format!("[{cursor}, {pixel_count}) is not covered")));
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Partition {
    type Item = &'a PixelRange;
    type IntoIter = std::slice::Iter<'a, PixelRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_basics() {
        let r = PixelRange::new(3, 7);
        assert_eq!(r.len(), 4);
        assert!(!r.is_empty());
        assert!(r.contains(3));
        assert!(!r.contains(7));
        assert_eq!(r.as_range(), 3..7);
        assert_eq!(r.to_string(), "[3, 7)");

        assert!(PixelRange::new(5, 5).is_empty());
        assert_eq!(PixelRange::new(6, 2).len(), 0);
        assert_eq!(PixelRange::with_len(2, 3), PixelRange::new(2, 5));
    }

    #[test]
    fn test_validate_accepts_cover_with_empty_ranges() {
        let part = Partition::from_ranges(vec![
            PixelRange::new(0, 0),
            PixelRange::new(0, 1),
            PixelRange::new(1, 1),
        ]);
        assert!(part.validate(1).is_ok());
        assert_eq!(part.covered(), 1);
    }

    #[test]
    fn test_validate_empty_partition_of_zero_pixels() {
        assert!(Partition::default().validate(0).is_ok());
        assert!(Partition::default().validate(1).is_err());
    }

    #[test]
    fn test_validate_rejects_gap() {
        let part = Partition::from_ranges(vec![PixelRange::new(0, 2), PixelRange::new(3, 5)]);
        let err = part.validate(5).unwrap_err().to_string();
        assert!(err.contains("gap"), "{err}");
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let part = Partition::from_ranges(vec![PixelRange::new(0, 3), PixelRange::new(2, 5)]);
        let err = part.validate(5).unwrap_err().to_string();
        assert!(err.contains("overlaps"), "{err}");
    }

    #[test]
    fn test_validate_rejects_out_of_bounds() {
        let part = Partition::from_ranges(vec![PixelRange::new(0, 6)]);
        let err = part.validate(5).unwrap_err().to_string();
        assert!(err.contains("out of bounds"), "{err}");
    }

    #[test]
    fn test_validate_rejects_short_cover() {
        let part = Partition::from_ranges(vec![PixelRange::new(0, 4)]);
        assert!(part.validate(5).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted() {
        let part = Partition::from_ranges(vec![PixelRange::new(0, 3), PixelRange::new(3, 1)]);
        let err = part.validate(3).unwrap_err().to_string();
        assert!(err.contains("inverted"), "{err}");
    }
}
