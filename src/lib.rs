//! Binsheet - Streaming decoder for Excel binary workbook (.xlsb) parts
//!
//! This library reads the binary record streams inside an .xlsb workbook and
//! renders cell values with Excel-faithful number formatting.
//!
//! # Features
//!
//! - **Record framing**: Variable-length record headers with size limits
//! - **Row streaming**: Worksheet rows decoded lazily, in sparse or dense mode
//! - **Sheet metadata**: Dimension, column definitions, merged regions and hyperlinks
//! - **Shared strings and styles**: String table and cell-format resolution
//! - **Number formats**: Sections, conditions, fractions, scientific notation,
//!   dates and elapsed times
//!
//! # Example - Reading a worksheet part
//!
//! ```no_run
//! use binsheet::ooxml::xlsb::{ScanOptions, Worksheet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("xl/worksheets/sheet1.bin")?;
//! let sheet = Worksheet::scan(data, None, None)?;
//!
//! println!("Dimension: {:?}", sheet.dimension());
//! for row in sheet.rows(ScanOptions::new()) {
//!     for cell in row? {
//!         println!("{} = {}", cell.coordinate(), cell.value);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Formatting a value
//!
//! ```
//! use binsheet::sheet::CellValue;
//! use binsheet::sheet::numfmt::format_value;
//!
//! let text = format_value(&CellValue::Number(-1234.5), 164, "#,##0.00;(#,##0.00)", false);
//! assert_eq!(text, "(1,234.50)");
//! ```

/// Low-level helpers shared by the part decoders
pub mod common;

/// OOXML (Office Open XML) binary part decoders
///
/// This module provides the .xlsb record, worksheet, style and string
/// table decoders.
pub mod ooxml;

/// Cell values and number-format rendering
pub mod sheet;

// Re-export commonly used types for convenience
pub use ooxml::xlsb;
pub use sheet::CellValue;
