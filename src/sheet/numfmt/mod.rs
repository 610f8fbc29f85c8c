//! Number format rendering
//!
//! Turns a raw cell value and a number format into the text a spreadsheet
//! application would display. Formats are tokenized into up to four
//! sections; the value's sign (or an explicit `[>=100]` condition) selects the
//! section, and the section's tokens decide the rendering mode:
//!
//! - fixed-point numbers with grouping, scaling and padding (`#,##0.00`)
//! - scientific and engineering notation (`0.00E+00`, `##0.0E+0`)
//! - fractions with mixed or improper form (`# ?/?`, `?/16`)
//! - dates, times and elapsed durations (`yyyy-mm-dd`, `[h]:mm:ss`)
//! - text through a `@` placeholder
//!
//! Rendering never fails. Anything that cannot be applied falls back to the
//! `General` format.
//!
//! # Examples
//!
//! ```
//! use binsheet::sheet::CellValue;
//! use binsheet::sheet::numfmt::format_value;
//!
//! assert_eq!(format_value(&CellValue::Number(1234.5), 4, "", false), "1,234.50");
//! assert_eq!(format_value(&CellValue::Number(45285.0), 164, "d mmm yyyy", false), "25 Dec 2023");
//! ```

mod catalog;
mod datetime;
mod fraction;
mod general;
mod number;
mod parser;
mod render;
mod tokens;

pub use catalog::{
    FIRST_CUSTOM_FORMAT_ID, FormatCatalog, StyleEntry, builtin_format, is_date_format,
};
pub use general::format_general;
pub use parser::{FormatSection, MAX_SECTIONS, ParsedFormat};
pub use tokens::{ConditionOp, FormatToken};

use crate::sheet::CellValue;

/// The format string a style actually uses: the custom string when present,
/// else the built-in one, else `General`
pub fn resolve_format(num_fmt_id: u32, format_code: &str) -> &str {
    if !format_code.is_empty() {
        return format_code;
    }
    builtin_format(num_fmt_id).unwrap_or("General")
}

/// Render `value` with a number format.
///
/// `format_code` is the style's custom format string, or empty for built-in
/// formats. `date1904` selects the 1904 date system for date formats.
pub fn format_value(value: &CellValue, num_fmt_id: u32, format_code: &str, date1904: bool) -> String {
    let format = resolve_format(num_fmt_id, format_code);
    if format.eq_ignore_ascii_case("general") {
        return match value {
            CellValue::Number(n) => format_general(*n),
            other => other.to_string(),
        };
    }
    ParsedFormat::parse(format).format(value, date1904)
}
