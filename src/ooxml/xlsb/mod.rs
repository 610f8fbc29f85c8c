//! Excel binary workbook (.xlsb) part decoder
//!
//! An .xlsb workbook stores each part (worksheets, styles, shared strings,
//! workbook properties) as a stream of length-prefixed binary records. This
//! module decodes those parts once the container has been unpacked:
//!
//! - **Records**: variable-length record headers and payload framing
//! - **Worksheets**: a metadata pass (dimension, columns, merges, hyperlinks)
//!   followed by streamed row decoding in sparse or dense mode
//! - **Shared strings**: the string table referenced by string cells
//! - **Styles**: cell formats and custom number formats, ready for rendering
//!   through [`crate::sheet::numfmt`]
//! - **Workbook properties**: the 1900/1904 date system flag
//!
//! Malformed single records are logged and skipped. Framing errors, where
//! the record stream itself can no longer be followed, are returned.
//!
//! # Examples
//!
//! ```rust,no_run
//! use binsheet::ooxml::xlsb::{ScanOptions, SharedStrings, StylesTable, WorkbookProps, Worksheet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let strings = SharedStrings::parse(std::fs::read("sharedStrings.bin")?)?;
//! let styles = StylesTable::parse(std::fs::read("styles.bin")?)?.to_catalog();
//! let props = WorkbookProps::parse(std::fs::read("workbook.bin")?)?;
//!
//! let sheet = Worksheet::scan(std::fs::read("sheet1.bin")?, Some(&strings), None)?;
//! for row in sheet.rows(ScanOptions::new().with_dense(true)) {
//!     for cell in row? {
//!         let text = styles.format_cell(&cell.value, cell.style, props.date1904);
//!         println!("{}: {}", cell.coordinate(), text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Reference
//!
//! - [MS-XLSB]: Excel Binary File Format (.xlsb) Structure Specification
//!   https://docs.microsoft.com/en-us/openspecs/office_file_formats/ms-xlsb/

/// Error types for XLSB parsing
mod error;

/// Record framing
mod records;

/// Cell records and values
mod cell;

/// Streamed row decoding
mod cells_reader;

/// Worksheet metadata pass
mod worksheet;

/// Cell ranges and A1 references
mod utils;

/// Shared string table
mod shared_strings;

/// Cell formats and custom number formats
mod styles_table;

/// Workbook properties
mod workbook;

/// Date and time utilities
pub mod date_utils;

/// Merged cell support
pub mod merged_cells;

/// Hyperlink support
pub mod hyperlinks;


pub use cell::{Cell, MAX_COL, MAX_ROW, MAX_STYLE, error_code_name};
pub use cells_reader::{Row, Rows};
pub use error::{XlsbError, XlsbResult};
pub use hyperlinks::{Hyperlink, HyperlinkMap};
pub use merged_cells::MergeRegion;
pub use records::{MAX_RECORD_LEN, RecordStream, XlsbRecord, XlsbRecordHeader, record_types};
pub use shared_strings::SharedStrings;
pub use styles_table::StylesTable;
pub use utils::{RangeRef, cell_reference, column_index_to_name, range_reference};
pub use workbook::WorkbookProps;
pub use worksheet::{ColumnDef, Dimension, ScanOptions, Worksheet};
