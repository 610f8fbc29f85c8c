//! Worksheet metadata scan for XLSB files
//!
//! A worksheet part is decoded in two passes over the same bytes. [`Worksheet::scan`]
//! walks the whole part once, collecting the sheet dimension, column
//! definitions, merged regions and hyperlinks, and remembers where the row
//! data starts. Row data itself is only streamed later by
//! [`Worksheet::rows`](crate::ooxml::xlsb::worksheet::Worksheet::rows), which can
//! be restarted any number of times.

use crate::common::binary::FieldReader;
use crate::ooxml::xlsb::cell::MAX_STYLE;
use crate::ooxml::xlsb::error::{XlsbError, XlsbResult};
use crate::ooxml::xlsb::hyperlinks::{Hyperlink, HyperlinkMap};
use crate::ooxml::xlsb::merged_cells::MergeRegion;
use crate::ooxml::xlsb::records::{RecordStream, record_types};
use crate::ooxml::xlsb::shared_strings::SharedStrings;
use crate::ooxml::xlsb::utils::RangeRef;
use bytes::Bytes;
use std::collections::HashMap;
use std::io::Cursor;

/// Used area of a worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    /// First used row (0-based)
    pub row: u32,
    /// First used column (0-based)
    pub col: u32,
    /// Number of rows
    pub height: u32,
    /// Number of columns
    pub width: u32,
}

impl Dimension {
    /// Decode a dimension record payload
    pub fn parse(data: &[u8]) -> XlsbResult<Self> {
        let range = RangeRef::read(&mut FieldReader::new(data))?.within_sheet()?;
        Ok(Dimension {
            row: range.row_first,
            col: range.col_first,
            height: range.height(),
            width: range.width(),
        })
    }

    /// Number of cells in every decoded row.
    ///
    /// Rows start at column 0, so this spans up to the last used column.
    #[inline]
    pub fn row_width(&self) -> usize {
        (self.col as usize + self.width as usize).max(1)
    }
}

impl Default for Dimension {
    /// Single cell at the origin, used when a sheet has no dimension record.
    fn default() -> Self {
        Dimension {
            row: 0,
            col: 0,
            height: 1,
            width: 1,
        }
    }
}

/// Width and default style for a run of columns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDef {
    /// First column (0-based)
    pub first_col: u32,
    /// Last column (0-based, inclusive)
    pub last_col: u32,
    /// Width in characters
    pub width: f64,
    /// Default style index
    pub style: u32,
}

impl ColumnDef {
    /// Decode a column record payload.
    ///
    /// The width is stored in 1/256ths of a character.
    pub fn parse(data: &[u8]) -> XlsbResult<Self> {
        let mut reader = FieldReader::new(data);
        let first_col = reader.read_u32()?;
        let last_col = reader.read_u32()?;
        let width_raw = reader.read_u32()?;
        let style = reader.read_u32()?;
        if style > MAX_STYLE {
            return Err(XlsbError::InvalidValue {
                field: "column style index",
                value: style as u64,
            });
        }
        Ok(ColumnDef {
            first_col,
            last_col,
            width: width_raw as f64 / 256.0,
            style,
        })
    }

    #[inline]
    pub fn contains(&self, col: u32) -> bool {
        (self.first_col..=self.last_col).contains(&col)
    }
}

/// Options for streaming rows
///
/// # Examples
///
/// ```rust
/// use binsheet::ooxml::xlsb::ScanOptions;
///
/// // Sparse by default: only rows present in the file are yielded
/// let options = ScanOptions::default();
/// assert!(!options.dense);
///
/// // Dense: gaps between rows are filled with blank rows
/// let options = ScanOptions::new().with_dense(true);
/// assert!(options.dense);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Emit blank rows for row indices missing from the file
    pub dense: bool,
}

impl ScanOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether missing rows are synthesized as blank rows
    #[inline]
    pub fn with_dense(mut self, dense: bool) -> Self {
        self.dense = dense;
        self
    }
}

/// A scanned worksheet part.
///
/// Holds the raw part bytes plus the metadata found by the first pass.
#[derive(Debug, Clone)]
pub struct Worksheet<'a> {
    pub(crate) data: Bytes,
    pub(crate) shared_strings: Option<&'a SharedStrings>,
    dimension: Option<Dimension>,
    columns: Vec<ColumnDef>,
    merges: Vec<MergeRegion>,
    hyperlinks: HyperlinkMap,
    data_offset: Option<u64>,
}

impl<'a> Worksheet<'a> {
    /// Run the metadata pass over a worksheet part.
    ///
    /// Hyperlinks are collected only when `rels` is supplied; their targets
    /// are resolved against it. Single malformed metadata records are
    /// skipped. Framing errors are fatal, and so is a part that ends before
    /// the row data is closed.
    pub fn scan(
        data: impl Into<Bytes>,
        shared_strings: Option<&'a SharedStrings>,
        rels: Option<&HashMap<String, String>>,
    ) -> XlsbResult<Self> {
        let data = data.into();
        let mut sheet = Worksheet {
            data: data.clone(),
            shared_strings,
            dimension: None,
            columns: Vec::new(),
            merges: Vec::new(),
            hyperlinks: HyperlinkMap::new(),
            data_offset: None,
        };

        let mut stream = RecordStream::new(Cursor::new(data));
        while let Some(record) = stream.read_record()? {
            match record.record_type {
                record_types::DIMENSION => match Dimension::parse(&record.data) {
                    Ok(dim) => sheet.dimension = Some(dim),
                    Err(e) => log::warn!("skipping dimension record: {e}"),
                },
                record_types::COL => match ColumnDef::parse(&record.data) {
                    Ok(col) => sheet.columns.push(col),
                    Err(e) => log::warn!("skipping column record: {e}"),
                },
                record_types::SHEET_DATA => {
                    sheet.data_offset = Some(stream.offset());
                    skip_row_data(&mut stream)?;
                },
                record_types::MERGE_CELL => match MergeRegion::parse(&record.data) {
                    Ok(merge) => sheet.merges.push(merge),
                    Err(e) => log::warn!("skipping merge record: {e}"),
                },
                record_types::HYPERLINK => {
                    let Some(rels) = rels else { continue };
                    match Hyperlink::parse(&record.data) {
                        Ok(link) => sheet.hyperlinks.insert(link.with_target(rels)),
                        Err(e) => log::warn!("skipping hyperlink record: {e}"),
                    }
                },
                _ => {},
            }
        }

        log::debug!(
            "worksheet scanned: dimension {:?}, {} columns, {} merges, {} hyperlinks, row data at {:?}",
            sheet.dimension,
            sheet.columns.len(),
            sheet.merges.len(),
            sheet.hyperlinks.len(),
            sheet.data_offset
        );
        Ok(sheet)
    }

    /// Dimension record, or a 1×1 area at the origin when the part has none
    #[inline]
    pub fn dimension(&self) -> Dimension {
        self.dimension.unwrap_or_default()
    }

    /// Whether the part carried a usable dimension record
    #[inline]
    pub fn has_dimension(&self) -> bool {
        self.dimension.is_some()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Column definition covering `col`
    pub fn column(&self, col: u32) -> Option<&ColumnDef> {
        self.columns.iter().find(|def| def.contains(col))
    }

    pub fn merges(&self) -> &[MergeRegion] {
        &self.merges
    }

    /// Merge region covering `(row, col)`
    pub fn merge_at(&self, row: u32, col: u32) -> Option<&MergeRegion> {
        self.merges.iter().find(|m| m.contains(row, col))
    }

    pub fn hyperlinks(&self) -> &HyperlinkMap {
        &self.hyperlinks
    }

    /// Byte offset of the first record after the row-data start marker
    #[inline]
    pub fn data_offset(&self) -> Option<u64> {
        self.data_offset
    }

    /// Whether the part has a row-data block at all
    #[inline]
    pub fn has_row_data(&self) -> bool {
        self.data_offset.is_some()
    }
}

/// Skip the row and cell records up to and including the row-data end marker.
///
/// Payloads are discarded without buffering. Running out of bytes here is an
/// error, never a normal end.
fn skip_row_data<R: std::io::Read>(stream: &mut RecordStream<R>) -> XlsbResult<()> {
    loop {
        let header = stream.read_header()?.ok_or_else(|| {
            XlsbError::UnexpectedEndOfStream(format!(
                "row data not closed at offset {}",
                stream.offset()
            ))
        })?;
        stream.skip_payload(&header)?;
        if header.record_type == record_types::SHEET_DATA_END {
            return Ok(());
        }
    }
}
