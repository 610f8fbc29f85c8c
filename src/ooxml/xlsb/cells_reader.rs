//! Row streaming for XLSB worksheets
//!
//! [`Rows`] reopens the part at the recorded row-data offset and decodes rows
//! lazily. Dropping it early leaves the [`Worksheet`] untouched, and calling
//! [`Worksheet::rows`] again starts over from the same offset.

use crate::ooxml::xlsb::cell::{Cell, parse_cell, parse_row_index};
use crate::ooxml::xlsb::error::{XlsbError, XlsbResult};
use crate::ooxml::xlsb::records::{RecordStream, record_types};
use crate::ooxml::xlsb::worksheet::{ScanOptions, Worksheet};
use crate::sheet::CellValue;
use bytes::Bytes;
use std::io::Cursor;
use std::ops::Range;

/// One decoded row: a cell for every column from 0 to the last used column
pub type Row = Vec<Cell>;

impl<'a> Worksheet<'a> {
    /// Stream the rows of this sheet.
    ///
    /// A sheet without a row-data block yields nothing.
    pub fn rows(&self, options: ScanOptions) -> Rows<'_, 'a> {
        let mut stream = RecordStream::new(Cursor::new(self.data.clone()));
        let mut pending_error = None;
        let finished = match self.data_offset() {
            Some(offset) => {
                if let Err(e) = stream.seek_to(offset) {
                    pending_error = Some(e);
                }
                false
            },
            None => true,
        };

        let dimension = self.dimension();
        Rows {
            sheet: self,
            stream,
            dense: options.dense,
            width: dimension.row_width(),
            last_row: self
                .has_dimension()
                .then(|| dimension.row + dimension.height - 1),
            current: None,
            open: None,
            ready: None,
            blanks: 0..0,
            pending_error,
            finished,
        }
    }
}

/// Iterator over the rows of a [`Worksheet`].
///
/// Yields `Ok` rows in file order. A framing error is yielded once, after
/// which the iterator is fused.
pub struct Rows<'s, 'a> {
    sheet: &'s Worksheet<'a>,
    stream: RecordStream<Cursor<Bytes>>,
    dense: bool,
    width: usize,
    /// Last row of the recorded dimension; dense mode pads up to it
    last_row: Option<u32>,
    /// Index of the most recently opened row, blank rows included
    current: Option<u32>,
    open: Option<Row>,
    ready: Option<Row>,
    blanks: Range<u32>,
    pending_error: Option<XlsbError>,
    finished: bool,
}

impl Rows<'_, '_> {
    fn empty_row(&self, index: u32) -> Row {
        (0..self.width as u32).map(|col| Cell::empty(index, col)).collect()
    }

    fn start_row(&mut self, index: u32) {
        if self.current == Some(index) {
            return;
        }
        self.ready = self.open.take();
        if self.dense {
            let first = self.current.map_or(0, |c| c.saturating_add(1));
            self.blanks = first..index;
        }
        self.current = Some(index);
        self.open = Some(self.empty_row(index));
    }

    /// Flush the open row and stop reading
    fn close(&mut self) {
        self.ready = self.open.take();
        self.finished = true;
        if self.dense
            && let Some(last) = self.last_row
        {
            let first = self.current.map_or(0, |c| c.saturating_add(1));
            self.blanks = first..last.saturating_add(1);
        }
    }

    fn place_cell(&mut self, mut cell: Cell) {
        let Some(row) = self.open.as_mut() else {
            return;
        };
        let Some(slot) = row.get_mut(cell.col as usize) else {
            return;
        };
        if let Some(merge) = self.sheet.merge_at(cell.row, cell.col)
            && !merge.is_anchor(cell.row, cell.col)
        {
            cell.value = CellValue::Empty;
        }
        *slot = cell;
    }

    /// Consume one record. Returns `Err` only for framing errors.
    fn step(&mut self) -> XlsbResult<()> {
        let Some(record) = self.stream.read_record()? else {
            self.close();
            return Ok(());
        };

        match record.record_type {
            record_types::ROW => match parse_row_index(&record.data) {
                Ok(index) => self.start_row(index),
                Err(e) => log::warn!("skipping row record: {e}"),
            },
            t if record_types::is_cell(t) => {
                let Some(row) = self.current.filter(|_| self.open.is_some()) else {
                    return Ok(());
                };
                match parse_cell(t, &record.data, row, self.sheet.shared_strings) {
                    Ok(cell) => self.place_cell(cell),
                    Err(e) => log::warn!("skipping cell record 0x{t:02X} in row {row}: {e}"),
                }
            },
            record_types::SHEET_DATA_END => self.close(),
            _ => {},
        }
        Ok(())
    }
}

impl Iterator for Rows<'_, '_> {
    type Item = XlsbResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.ready.take() {
                return Some(Ok(row));
            }
            if let Some(index) = self.blanks.next() {
                return Some(Ok(self.empty_row(index)));
            }
            if let Some(e) = self.pending_error.take() {
                self.finished = true;
                return Some(Err(e));
            }
            if self.finished {
                return None;
            }
            if let Err(e) = self.step() {
                self.open = None;
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsb::records::test_support::*;
    use crate::ooxml::xlsb::shared_strings::SharedStrings;

    fn float(col: u32, v: f64) -> Vec<u8> {
        cell(record_types::FLOAT, col, 0, &v.to_le_bytes())
    }

    fn sheet_with(dimension: Option<(u32, u32, u32, u32)>, rows: &[Vec<u8>], tail: &[Vec<u8>]) -> Vec<u8> {
        let mut data = Vec::new();
        if let Some((r1, r2, c1, c2)) = dimension {
            data.extend(record(record_types::DIMENSION, &range(r1, r2, c1, c2)));
        }
        data.extend(record(record_types::SHEET_DATA, &[]));
        for r in rows {
            data.extend_from_slice(r);
        }
        data.extend(record(record_types::SHEET_DATA_END, &[]));
        for t in tail {
            data.extend_from_slice(t);
        }
        data
    }

    fn collect(sheet: &Worksheet<'_>, dense: bool) -> Vec<Row> {
        sheet
            .rows(ScanOptions::new().with_dense(dense))
            .collect::<XlsbResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_single_float_sparse() {
        let data = sheet_with(None, &[row(0), float(0, 42.0)], &[]);
        let sheet = Worksheet::scan(data, None, None).unwrap();
        let rows = collect(&sheet, false);
        assert_eq!(rows, vec![vec![Cell::new(0, 0, CellValue::Number(42.0), 0)]]);
    }

    #[test]
    fn test_dense_fills_gaps() {
        let data = sheet_with(
            Some((0, 4, 0, 1)),
            &[row(1), float(1, 1.0), row(4), float(0, 4.0)],
            &[],
        );
        let sheet = Worksheet::scan(data, None, None).unwrap();

        let sparse = collect(&sheet, false);
        assert_eq!(sparse.len(), 2);
        assert_eq!(sparse[0][1].value, CellValue::Number(1.0));
        assert_eq!(sparse[1][0].row, 4);

        let dense = collect(&sheet, true);
        assert_eq!(dense.len(), 5);
        assert!(dense.len() as u32 >= sheet.dimension().height);
        for (i, r) in dense.iter().enumerate() {
            assert_eq!(r.len(), 2);
            assert!(r.iter().all(|c| c.row == i as u32));
        }
        assert!(dense[0].iter().all(|c| c.value.is_empty()));
        assert_eq!(dense[1][1].value, CellValue::Number(1.0));
        assert!(dense[2][0].value.is_empty());
        assert_eq!(dense[4][0].value, CellValue::Number(4.0));
    }

    #[test]
    fn test_dense_pads_to_recorded_height() {
        let data = sheet_with(Some((0, 3, 0, 0)), &[row(1), float(0, 1.0)], &[]);
        let sheet = Worksheet::scan(data, None, None).unwrap();

        assert_eq!(collect(&sheet, false).len(), 1);
        let dense = collect(&sheet, true);
        assert_eq!(dense.len(), 4);
        assert_eq!(dense[1][0].value, CellValue::Number(1.0));
        assert_eq!(dense[3][0].row, 3);
        assert!(dense[3][0].value.is_empty());
    }

    #[test]
    fn test_duplicate_row_marker_keeps_cells() {
        let data = sheet_with(
            Some((0, 0, 0, 1)),
            &[row(0), float(0, 1.0), row(0), float(1, 2.0)],
            &[],
        );
        let sheet = Worksheet::scan(data, None, None).unwrap();
        let rows = collect(&sheet, false);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].value, CellValue::Number(1.0));
        assert_eq!(rows[0][1].value, CellValue::Number(2.0));
    }

    #[test]
    fn test_merge_region_only_anchor_has_value() {
        let data = sheet_with(
            Some((0, 1, 0, 1)),
            &[row(0), float(0, 7.0), float(1, 8.0), row(1), float(0, 9.0)],
            &[record(record_types::MERGE_CELL, &range(0, 1, 0, 1))],
        );
        let sheet = Worksheet::scan(data, None, None).unwrap();
        let rows = collect(&sheet, true);
        assert_eq!(rows[0][0].value, CellValue::Number(7.0));
        for (r, c) in [(0, 1), (1, 0), (1, 1)] {
            assert!(rows[r][c].value.is_empty());
        }
    }

    #[test]
    fn test_cells_outside_row_width_and_before_first_row_are_dropped() {
        let data = sheet_with(
            Some((0, 0, 0, 0)),
            &[float(0, 1.0), row(0), float(5, 2.0), float(0, 3.0)],
            &[],
        );
        let sheet = Worksheet::scan(data, None, None).unwrap();
        let rows = collect(&sheet, false);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec![Cell::new(0, 0, CellValue::Number(3.0), 0)]);
    }

    #[test]
    fn test_bad_records_skip_only_themselves() {
        let data = sheet_with(
            Some((0, 2, 0, 0)),
            &[
                record(record_types::ROW, &[0x01]),
                row(0),
                record(record_types::FLOAT, &[0x00, 0x00]),
                float(0, 5.0),
                record(record_types::ROW, &0x10_0000u32.to_le_bytes()),
                row(2),
            ],
            &[],
        );
        let sheet = Worksheet::scan(data, None, None).unwrap();
        let rows = collect(&sheet, false);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].value, CellValue::Number(5.0));
        assert_eq!(rows[1][0].row, 2);
    }

    #[test]
    fn test_shared_strings_resolved() {
        let sst = SharedStrings::from_strings(vec!["a".into(), "b".into()]);
        let data = sheet_with(
            None,
            &[row(0), cell(record_types::STRING, 0, 2, &1u32.to_le_bytes())],
            &[],
        );
        let sheet = Worksheet::scan(data, Some(&sst), None).unwrap();
        let rows = collect(&sheet, false);
        assert_eq!(rows[0][0], Cell::new(0, 0, CellValue::Text("b".into()), 2));
    }

    #[test]
    fn test_restart_after_early_stop() {
        let data = sheet_with(
            Some((0, 2, 0, 0)),
            &[row(0), float(0, 1.0), row(1), float(0, 2.0), row(2), float(0, 3.0)],
            &[],
        );
        let sheet = Worksheet::scan(data, None, None).unwrap();

        let mut partial = sheet.rows(ScanOptions::default());
        assert!(partial.next().is_some());
        drop(partial);

        let first = collect(&sheet, false);
        let second = collect(&sheet, false);
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_row_data_yields_nothing() {
        let data = record(record_types::DIMENSION, &range(0, 0, 0, 0));
        let sheet = Worksheet::scan(data, None, None).unwrap();
        assert_eq!(sheet.rows(ScanOptions::default()).count(), 0);
    }

    #[test]
    fn test_framing_error_is_yielded_once() {
        let data = sheet_with(Some((0, 0, 0, 0)), &[row(0), float(0, 1.0)], &[]);
        let mut sheet = Worksheet::scan(data, None, None).unwrap();
        // Corrupt the row data after the metadata pass
        let offset = sheet.data_offset().unwrap() as usize;
        let mut bytes = sheet.data.to_vec();
        bytes.truncate(offset + 1);
        sheet.data = Bytes::from(bytes);

        let mut rows = sheet.rows(ScanOptions::default());
        assert!(matches!(rows.next(), Some(Err(_))));
        assert!(rows.next().is_none());
    }
}
