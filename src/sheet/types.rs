//! Common types for spreadsheet values.

use std::fmt;

/// Types of data that can be stored in a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// Numeric value (dates are numbers with a date format)
    Number(f64),
    /// Boolean value
    Boolean(bool),
    /// String value
    Text(String),
    /// Error value such as `#DIV/0!`
    ErrorCode(String),
}

impl CellValue {
    /// Shared empty value for borrowed lookups.
    pub const EMPTY: &'static CellValue = &CellValue::Empty;

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The numeric payload, if this is a number.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Text(s) | CellValue::ErrorCode(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}
