//! Error types for XLSB part decoding

use crate::common::binary::BinaryError;
use thiserror::Error;

/// Result type alias for XLSB operations
pub type XlsbResult<T> = Result<T, XlsbError>;

/// Errors that can occur while decoding XLSB record streams
#[derive(Error, Debug)]
pub enum XlsbError {
    /// I/O error from the underlying byte source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload field read failed
    #[error("Field error: {0}")]
    Field(#[from] BinaryError),

    /// Record ID or length kept its continuation bit past the fourth byte
    #[error("Corrupt record header at offset {offset}: {what} exceeds 4 bytes")]
    CorruptHeader {
        /// Byte offset of the record start
        offset: u64,
        /// Which header field overflowed
        what: &'static str,
    },

    /// Declared payload length above the accepted maximum
    #[error("Record 0x{record_type:04X} declares {len} bytes, limit is {max}")]
    OversizedRecord {
        /// Record type
        record_type: u32,
        /// Declared length
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// Stream ended inside a record
    #[error("Unexpected end of stream: {0}")]
    UnexpectedEndOfStream(String),

    /// A range failed validation (last < first, or beyond the sheet limits)
    #[error("Invalid range: rows {row_first}..={row_last}, cols {col_first}..={col_last}")]
    InvalidRange {
        /// First row
        row_first: u32,
        /// Last row
        row_last: u32,
        /// First column
        col_first: u32,
        /// Last column
        col_last: u32,
    },

    /// A single scalar field is outside its permitted range
    #[error("Invalid {field}: {value}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Offending value
        value: u64,
    },
}
