//! XLSB record framing
//!
//! XLSB parts are a flat sequence of self-delimited records. Each record is a
//! variable-length type ID, a variable-length payload size and the payload:
//!
//! - The type ID is 1–4 bytes. The high bit of each byte flags a following
//!   byte, but every byte keeps all 8 bits: byte `i` contributes `b << (8 * i)`.
//!   The constants in [`record_types`] are therefore the on-disk byte values,
//!   e.g. `SHEET_DATA = 0x0191` is stored as `91 01`.
//! - The payload size is 1–4 bytes of little-endian base-128 (7 bits per byte).
//!
//! A fourth byte that still carries the continuation bit is corruption, as is
//! any stream that ends after the first ID byte has been read.

use crate::ooxml::xlsb::error::{XlsbError, XlsbResult};
use bytes::Bytes;
use std::io::{self, Read, Seek, SeekFrom};

/// Largest payload the stream will allocate for.
pub const MAX_RECORD_LEN: usize = 10 * 1024 * 1024;

/// Record type IDs used by worksheet, style, shared-string and workbook parts.
pub mod record_types {
    // Row and cell records
    pub const ROW: u32 = 0x0000;
    pub const BLANK: u32 = 0x0001;
    pub const NUM: u32 = 0x0002;
    pub const BOOL_ERR: u32 = 0x0003;
    pub const BOOL: u32 = 0x0004;
    pub const FLOAT: u32 = 0x0005;
    pub const STRING: u32 = 0x0007;
    pub const FORMULA_STRING: u32 = 0x0008;
    pub const FORMULA_FLOAT: u32 = 0x0009;
    pub const FORMULA_BOOL: u32 = 0x000A;
    pub const FORMULA_BOOL_ERR: u32 = 0x000B;

    // Shared string table
    pub const SI: u32 = 0x0013;
    pub const SST: u32 = 0x019F;
    pub const SST_END: u32 = 0x01A0;

    // Styles
    pub const NUM_FMT: u32 = 0x002C;
    pub const XF: u32 = 0x002F;
    pub const CELL_XFS: u32 = 0x04E9;
    pub const CELL_XFS_END: u32 = 0x04EA;

    // Worksheet structure
    pub const COL: u32 = 0x003C;
    pub const WORKSHEET: u32 = 0x0181;
    pub const WORKSHEET_END: u32 = 0x0182;
    pub const SHEET_DATA: u32 = 0x0191;
    pub const SHEET_DATA_END: u32 = 0x0192;
    pub const DIMENSION: u32 = 0x0194;
    pub const MERGE_CELL: u32 = 0x01B0;
    pub const MERGE_CELLS: u32 = 0x01B1;
    pub const MERGE_CELLS_END: u32 = 0x01B2;
    pub const COLS: u32 = 0x0386;
    pub const COLS_END: u32 = 0x0387;
    pub const HYPERLINK: u32 = 0x03EE;

    // Workbook
    pub const WORKBOOK_PR: u32 = 0x0199;

    /// Whether `record_type` is one of the cell records (`BLANK..=FORMULA_BOOL_ERR`).
    #[inline]
    pub fn is_cell(record_type: u32) -> bool {
        (BLANK..=FORMULA_BOOL_ERR).contains(&record_type)
    }
}

/// Decoded record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XlsbRecordHeader {
    pub record_type: u32,
    pub data_len: usize,
}

/// XLSB record with its payload
#[derive(Debug, Clone)]
pub struct XlsbRecord {
    pub record_type: u32,
    pub data: Bytes,
}

/// Pull-based reader over a record stream.
///
/// As an [`Iterator`] it yields `Ok` records until a clean end of stream and
/// yields at most one `Err`, after which it is fused.
pub struct RecordStream<R> {
    reader: R,
    offset: u64,
    failed: bool,
}

impl<R: Read> RecordStream<R> {
    pub fn new(reader: R) -> Self {
        RecordStream {
            reader,
            offset: 0,
            failed: false,
        }
    }

    /// Byte offset of the next unread header.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_byte(&mut self) -> XlsbResult<Option<u8>> {
        let mut b = [0u8; 1];
        loop {
            match self.reader.read(&mut b) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(b[0]));
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read the next record header, or `None` at a clean end of stream.
    pub fn read_header(&mut self) -> XlsbResult<Option<XlsbRecordHeader>> {
        let start = self.offset;

        let mut record_type = 0u32;
        for i in 0..4 {
            let b = match self.read_byte()? {
                Some(b) => b,
                None if i == 0 => return Ok(None),
                None => {
                    return Err(XlsbError::UnexpectedEndOfStream(format!(
                        "record type at offset {start}"
                    )));
                },
            };
            record_type += (b as u32) << (8 * i);
            if b & 0x80 == 0 {
                break;
            }
            if i == 3 {
                return Err(XlsbError::CorruptHeader {
                    offset: start,
                    what: "record type",
                });
            }
        }

        let mut data_len = 0usize;
        for i in 0..4 {
            let b = self.read_byte()?.ok_or_else(|| {
                XlsbError::UnexpectedEndOfStream(format!(
                    "length of record 0x{record_type:04X} at offset {start}"
                ))
            })?;
            data_len += ((b & 0x7F) as usize) << (7 * i);
            if b & 0x80 == 0 {
                break;
            }
            if i == 3 {
                return Err(XlsbError::CorruptHeader {
                    offset: start,
                    what: "record length",
                });
            }
        }

        if data_len > MAX_RECORD_LEN {
            return Err(XlsbError::OversizedRecord {
                record_type,
                len: data_len,
                max: MAX_RECORD_LEN,
            });
        }

        Ok(Some(XlsbRecordHeader {
            record_type,
            data_len,
        }))
    }

    /// Read the payload that belongs to `header`.
    pub fn read_payload(&mut self, header: &XlsbRecordHeader) -> XlsbResult<Bytes> {
        let mut data = vec![0u8; header.data_len];
        match self.reader.read_exact(&mut data) {
            Ok(()) => {
                self.offset += header.data_len as u64;
                Ok(Bytes::from(data))
            },
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(XlsbError::UnexpectedEndOfStream(format!(
                    "payload of record 0x{:04X} ({} bytes)",
                    header.record_type, header.data_len
                )))
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Discard the payload that belongs to `header` without buffering it.
    pub fn skip_payload(&mut self, header: &XlsbRecordHeader) -> XlsbResult<()> {
        let want = header.data_len as u64;
        let copied = io::copy(&mut self.reader.by_ref().take(want), &mut io::sink())?;
        self.offset += copied;
        if copied < want {
            return Err(XlsbError::UnexpectedEndOfStream(format!(
                "payload of record 0x{:04X} ({} of {} bytes)",
                header.record_type, copied, want
            )));
        }
        Ok(())
    }

    /// Read one complete record, or `None` at a clean end of stream.
    pub fn read_record(&mut self) -> XlsbResult<Option<XlsbRecord>> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };
        let data = self.read_payload(&header)?;
        Ok(Some(XlsbRecord {
            record_type: header.record_type,
            data,
        }))
    }
}

impl<R: Read + Seek> RecordStream<R> {
    /// Reposition at an absolute byte offset, clearing any previous failure.
    pub fn seek_to(&mut self, offset: u64) -> XlsbResult<()> {
        self.offset = self.reader.seek(SeekFrom::Start(offset))?;
        self.failed = false;
        Ok(())
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = XlsbResult<XlsbRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_multi_byte_type_keeps_continuation_bit() {
        let data = record(record_types::SHEET_DATA, &[]);
        assert_eq!(&data, &[0x91, 0x01, 0x00]);

        let mut stream = RecordStream::new(Cursor::new(data));
        let rec = stream.next().unwrap().unwrap();
        assert_eq!(rec.record_type, 0x0191);
        assert!(rec.data.is_empty());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_leb128_length() {
        let payload = vec![0xEEu8; 300];
        let data = record(record_types::STRING, &payload);
        // 300 = 0b10_0101100 -> AC 02
        assert_eq!(&data[..3], &[0x07, 0xAC, 0x02]);

        let rec = RecordStream::new(Cursor::new(data)).read_record().unwrap().unwrap();
        assert_eq!(rec.data.len(), 300);
    }

    #[test]
    fn test_clean_end_of_stream() {
        let mut stream = RecordStream::new(Cursor::new(Vec::<u8>::new()));
        assert!(stream.read_record().unwrap().is_none());
    }

    #[test]
    fn test_id_without_length_is_error() {
        let mut stream = RecordStream::new(Cursor::new(vec![0x07]));
        assert!(matches!(
            stream.next(),
            Some(Err(XlsbError::UnexpectedEndOfStream(_)))
        ));
        // Fused after the error
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_truncated_type_is_error() {
        let mut stream = RecordStream::new(Cursor::new(vec![0x81]));
        assert!(matches!(
            stream.read_record(),
            Err(XlsbError::UnexpectedEndOfStream(_))
        ));
    }

    #[test]
    fn test_truncated_payload_is_error() {
        let mut data = record(record_types::FLOAT, &[0u8; 16]);
        data.truncate(data.len() - 1);
        let mut stream = RecordStream::new(Cursor::new(data));
        assert!(matches!(
            stream.read_record(),
            Err(XlsbError::UnexpectedEndOfStream(_))
        ));
    }

    #[test]
    fn test_fourth_type_byte_with_continuation() {
        let mut stream = RecordStream::new(Cursor::new(vec![0x80, 0x80, 0x80, 0x80, 0x00]));
        assert!(matches!(
            stream.read_record(),
            Err(XlsbError::CorruptHeader {
                what: "record type",
                ..
            })
        ));
    }

    #[test]
    fn test_fourth_length_byte_with_continuation() {
        let mut stream = RecordStream::new(Cursor::new(vec![0x01, 0xFF, 0xFF, 0xFF, 0xFF]));
        assert!(matches!(
            stream.read_record(),
            Err(XlsbError::CorruptHeader {
                what: "record length",
                ..
            })
        ));
    }

    #[test]
    fn test_oversized_payload_rejected_before_allocation() {
        // 0x0FFFFFFF bytes declared, nothing follows
        let mut stream = RecordStream::new(Cursor::new(vec![0x01, 0xFF, 0xFF, 0xFF, 0x7F]));
        assert!(matches!(
            stream.read_record(),
            Err(XlsbError::OversizedRecord { .. })
        ));
    }

    #[test]
    fn test_skip_and_seek() {
        let mut data = record(record_types::DIMENSION, &range(0, 0, 0, 0));
        let second = data.len() as u64;
        data.extend(record(record_types::SHEET_DATA_END, &[]));

        let mut stream = RecordStream::new(Cursor::new(data));
        let header = stream.read_header().unwrap().unwrap();
        stream.skip_payload(&header).unwrap();
        assert_eq!(stream.offset(), second);
        assert_eq!(
            stream.read_record().unwrap().unwrap().record_type,
            record_types::SHEET_DATA_END
        );

        stream.seek_to(second).unwrap();
        assert_eq!(
            stream.read_record().unwrap().unwrap().record_type,
            record_types::SHEET_DATA_END
        );
    }

    #[test]
    fn test_skip_truncated_payload_is_error() {
        let mut data = record(record_types::ROW, &[0u8; 10]);
        data.truncate(6);
        let mut stream = RecordStream::new(Cursor::new(data));
        let header = stream.read_header().unwrap().unwrap();
        assert!(stream.skip_payload(&header).is_err());
    }

    #[test]
    fn test_is_cell_range() {
        assert!(!record_types::is_cell(record_types::ROW));
        assert!(record_types::is_cell(record_types::BLANK));
        assert!(record_types::is_cell(record_types::FORMULA_BOOL_ERR));
        assert!(!record_types::is_cell(record_types::SI));
    }
}
