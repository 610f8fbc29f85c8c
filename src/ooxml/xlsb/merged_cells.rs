//! Merged cell range support for XLSB
//!
//! Only the anchor (top-left) cell of a merged region stores a value. Every
//! other coordinate inside the region decodes as empty.

use crate::common::binary::FieldReader;
use crate::ooxml::xlsb::error::XlsbResult;
use crate::ooxml::xlsb::utils::{RangeRef, range_reference};

/// Merged cell region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRegion {
    /// Anchor row (0-based)
    pub row: u32,
    /// Anchor column (0-based)
    pub col: u32,
    /// Number of rows covered
    pub height: u32,
    /// Number of columns covered
    pub width: u32,
}

impl MergeRegion {
    /// Create a new merged region from its anchor and size
    ///
    /// # Example
    ///
    /// ```rust
    /// use binsheet::ooxml::xlsb::merged_cells::MergeRegion;
    ///
    /// // Merge cells A1:B2
    /// let merged = MergeRegion::new(0, 0, 2, 2);
    /// assert_eq!(merged.to_range_string(), "A1:B2");
    /// ```
    pub fn new(row: u32, col: u32, height: u32, width: u32) -> Self {
        MergeRegion {
            row,
            col,
            height,
            width,
        }
    }

    /// Parse from a merge-cell record payload
    pub fn parse(data: &[u8]) -> XlsbResult<Self> {
        let range = RangeRef::read(&mut FieldReader::new(data))?.within_sheet()?;
        Ok(MergeRegion {
            row: range.row_first,
            col: range.col_first,
            height: range.height(),
            width: range.width(),
        })
    }

    /// Whether `(row, col)` lies inside the region
    #[inline]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.row
            && col >= self.col
            && (row - self.row) < self.height
            && (col - self.col) < self.width
    }

    /// Whether `(row, col)` is the anchor cell
    #[inline]
    pub fn is_anchor(&self, row: u32, col: u32) -> bool {
        row == self.row && col == self.col
    }

    /// Get the cell range as a string (e.g., "A1:B2")
    pub fn to_range_string(&self) -> String {
        range_reference(
            self.row,
            self.col,
            self.row + self.height - 1,
            self.col + self.width - 1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsb::records::test_support::range;

    #[test]
    fn test_parse_merge_region() {
        let merged = MergeRegion::parse(&range(1, 3, 2, 4)).unwrap();
        assert_eq!(merged, MergeRegion::new(1, 2, 3, 3));
        assert_eq!(merged.to_range_string(), "C2:E4");
    }

    #[test]
    fn test_contains_and_anchor() {
        let merged = MergeRegion::new(1, 1, 2, 2);
        assert!(merged.is_anchor(1, 1));
        assert!(merged.contains(2, 2));
        assert!(!merged.is_anchor(2, 2));
        assert!(!merged.contains(0, 1));
        assert!(!merged.contains(3, 1));
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(MergeRegion::parse(&range(3, 1, 0, 0)).is_err());
        assert!(MergeRegion::parse(&range(0, 0, 0, 0x4000)).is_err());
    }
}
