//! Workbook part properties
//!
//! Only the workbook-wide flags that change how cell values are rendered are
//! decoded here. Sheet lists and relationships are resolved by the caller.

use crate::common::binary::FieldReader;
use crate::ooxml::xlsb::error::XlsbResult;
use crate::ooxml::xlsb::records::{RecordStream, record_types};
use bytes::Bytes;
use std::io::Cursor;

/// `WorkbookPr` flag selecting the 1904 date system
const FLAG_DATE1904: u32 = 0x08;

/// Workbook-level properties from `xl/workbook.bin`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkbookProps {
    /// Serial dates count from 1904-01-01 instead of 1900-01-01
    pub date1904: bool,
}

impl WorkbookProps {
    /// Decode the properties from a workbook part.
    ///
    /// A workbook without a properties record uses the 1900 date system.
    pub fn parse(data: impl Into<Bytes>) -> XlsbResult<Self> {
        for record in RecordStream::new(Cursor::new(data.into())) {
            let record = record?;
            if record.record_type == record_types::WORKBOOK_PR {
                return Ok(Self::parse_record(&record.data).unwrap_or_else(|e| {
                    log::warn!("unreadable workbook properties, using defaults: {e}");
                    WorkbookProps::default()
                }));
            }
        }
        Ok(WorkbookProps::default())
    }

    fn parse_record(data: &[u8]) -> XlsbResult<Self> {
        let flags = FieldReader::new(data).read_u32()?;
        Ok(WorkbookProps {
            date1904: flags & FLAG_DATE1904 != 0,
        })
    }
}
