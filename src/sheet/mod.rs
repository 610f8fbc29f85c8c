//! Spreadsheet cell values and their display formatting.
//!
//! [`CellValue`] is the decoded value of one cell. The [`numfmt`] module
//! renders such values the way a spreadsheet application shows them, given
//! the number format of the cell's style.

// Submodule declarations
pub mod numfmt;
mod types;

// Re-exports
pub use types::CellValue;
