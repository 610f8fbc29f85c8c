//! XLSB styles table parsing
//!
//! Only the parts needed to render cell values are decoded: the custom number
//! formats and the cell XF list that maps a cell's style index to a number
//! format. Fonts, fills, borders and alignment are skipped.

use crate::common::binary::FieldReader;
use crate::ooxml::xlsb::error::XlsbResult;
use crate::ooxml::xlsb::records::{RecordStream, record_types};
use crate::sheet::numfmt::{FormatCatalog, StyleEntry};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::Cursor;

/// Number formats and cell formats of a workbook
#[derive(Debug, Clone, Default)]
pub struct StylesTable {
    /// Custom format strings keyed by number format ID
    pub num_fmts: HashMap<u32, String>,
    /// Number format ID of each cell XF, in style-index order
    pub cell_xfs: Vec<u32>,
}

impl StylesTable {
    /// Decode a styles part.
    ///
    /// XF records are only taken from the cell XF list; the cell-style XF
    /// list uses the same record type and is ignored. An XF payload too short
    /// to hold a number format ID keeps its slot with the General format.
    pub fn parse(data: impl Into<Bytes>) -> XlsbResult<Self> {
        let mut styles = StylesTable::default();
        let mut in_cell_xfs = false;

        for record in RecordStream::new(Cursor::new(data.into())) {
            let record = record?;
            match record.record_type {
                record_types::NUM_FMT => match Self::parse_num_fmt(&record.data) {
                    Ok((id, format_code)) => {
                        styles.num_fmts.insert(id, format_code);
                    },
                    Err(e) => log::warn!("skipping number format record: {e}"),
                },
                record_types::CELL_XFS => in_cell_xfs = true,
                record_types::CELL_XFS_END => in_cell_xfs = false,
                record_types::XF if in_cell_xfs => {
                    styles.cell_xfs.push(Self::parse_xf(&record.data));
                },
                _ => {},
            }
        }

        log::debug!(
            "loaded styles: {} custom number formats, {} cell formats",
            styles.num_fmts.len(),
            styles.cell_xfs.len()
        );
        Ok(styles)
    }

    /// Number format record: `u16` ID followed by the format string
    fn parse_num_fmt(data: &[u8]) -> XlsbResult<(u32, String)> {
        let mut reader = FieldReader::new(data);
        let id = reader.read_u16()? as u32;
        let format_code = reader.read_string()?;
        Ok((id, format_code))
    }

    /// XF record: `u16` parent XF, then the `u16` number format ID
    fn parse_xf(data: &[u8]) -> u32 {
        let mut reader = FieldReader::new(data);
        reader
            .skip(2)
            .and_then(|_| reader.read_u16())
            .map(u32::from)
            .unwrap_or(0)
    }

    /// Style entries in style-index order, with custom format strings attached
    pub fn entries(&self) -> Vec<StyleEntry> {
        self.cell_xfs
            .iter()
            .map(|&id| {
                let format_code = self.num_fmts.get(&id).map_or("", String::as_str);
                StyleEntry::new(id, format_code)
            })
            .collect()
    }

    /// Catalog for resolving and rendering cell styles
    pub fn to_catalog(&self) -> FormatCatalog {
        FormatCatalog::new(self.entries())
    }
}
