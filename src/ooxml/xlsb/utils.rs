//! Utility functions for XLSB cell coordinates

use crate::common::binary::FieldReader;
use crate::ooxml::xlsb::cell::{MAX_COL, MAX_ROW};
use crate::ooxml::xlsb::error::{XlsbError, XlsbResult};

/// Inclusive cell range as stored at the start of dimension, merge and
/// hyperlink records: `row_first, row_last, col_first, col_last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRef {
    pub row_first: u32,
    pub row_last: u32,
    pub col_first: u32,
    pub col_last: u32,
}

impl RangeRef {
    /// Read the four bounds, rejecting ranges whose last index precedes the first.
    pub fn read(reader: &mut FieldReader<'_>) -> XlsbResult<Self> {
        let range = RangeRef {
            row_first: reader.read_u32()?,
            row_last: reader.read_u32()?,
            col_first: reader.read_u32()?,
            col_last: reader.read_u32()?,
        };
        if range.row_last < range.row_first || range.col_last < range.col_first {
            return Err(range.invalid());
        }
        Ok(range)
    }

    /// Additionally reject ranges reaching past the last sheet row or column.
    pub fn within_sheet(self) -> XlsbResult<Self> {
        if self.row_last > MAX_ROW || self.col_last > MAX_COL {
            return Err(self.invalid());
        }
        Ok(self)
    }

    fn invalid(&self) -> XlsbError {
        XlsbError::InvalidRange {
            row_first: self.row_first,
            row_last: self.row_last,
            col_first: self.col_first,
            col_last: self.col_last,
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        (self.row_last - self.row_first).saturating_add(1)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        (self.col_last - self.col_first).saturating_add(1)
    }
}

/// Convert column number to Excel column name (A, B, ..., Z, AA, AB, etc.)
///
/// Input is 1-based (1=A, 2=B, 26=Z, 27=AA, etc.)
pub fn column_index_to_name(mut col: u32) -> String {
    if col == 0 {
        return String::new();
    }

    let mut name = String::new();
    while col > 0 {
        col -= 1;
        let ch = (b'A' + (col % 26) as u8) as char;
        name.insert(0, ch);
        col /= 26;
    }
    name
}

/// Convert 0-based row and column to an Excel cell reference (e.g., "A1", "B2")
pub fn cell_reference(row: u32, col: u32) -> String {
    let mut out = column_index_to_name(col.saturating_add(1));
    out.push_str(itoa::Buffer::new().format(row as u64 + 1));
    out
}

/// Convert an inclusive 0-based range to `"A1:B2"` form
pub fn range_reference(row_first: u32, col_first: u32, row_last: u32, col_last: u32) -> String {
    format!(
        "{}:{}",
        cell_reference(row_first, col_first),
        cell_reference(row_last, col_last)
    )
}
