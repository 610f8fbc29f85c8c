//! Cell representation and cell-record decoding for XLSB worksheets

use crate::common::binary::FieldReader;
use crate::ooxml::xlsb::error::{XlsbError, XlsbResult};
use crate::ooxml::xlsb::records::record_types;
use crate::ooxml::xlsb::shared_strings::SharedStrings;
use crate::sheet::CellValue;
use std::borrow::Cow;

/// Largest valid 0-based row index.
pub const MAX_ROW: u32 = 0xF_FFFF;
/// Largest valid 0-based column index.
pub const MAX_COL: u32 = 0x3FFF;

/// Largest accepted style index.
pub const MAX_STYLE: u32 = 0x7FFF_FFFF;

/// A decoded cell.
///
/// Fields are ordered to minimize padding: the value first, then the u32 fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Cell value
    pub value: CellValue,
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
    /// Index into the workbook's cell-format table
    pub style: u32,
}

impl Cell {
    /// Create a new cell
    pub fn new(row: u32, col: u32, value: CellValue, style: u32) -> Self {
        Cell {
            value,
            row,
            col,
            style,
        }
    }

    /// An empty, unstyled cell
    #[inline]
    pub fn empty(row: u32, col: u32) -> Self {
        Cell::new(row, col, CellValue::Empty, 0)
    }

    /// Cell reference such as `"B3"`
    pub fn coordinate(&self) -> String {
        crate::ooxml::xlsb::utils::cell_reference(self.row, self.col)
    }
}

/// Display text for a cell error code.
///
/// Unknown codes render as their hex value, e.g. `0xff`.
pub fn error_code_name(code: u8) -> Cow<'static, str> {
    match code {
        0x00 => Cow::Borrowed("#NULL!"),
        0x07 => Cow::Borrowed("#DIV/0!"),
        0x0F => Cow::Borrowed("#VALUE!"),
        0x17 => Cow::Borrowed("#REF!"),
        0x1D => Cow::Borrowed("#NAME?"),
        0x24 => Cow::Borrowed("#NUM!"),
        0x2A => Cow::Borrowed("#N/A"),
        0x2B => Cow::Borrowed("#GETTING_DATA"),
        _ => Cow::Owned(format!("0x{:02x}", code)),
    }
}

/// Decode the row index of a row header record.
pub fn parse_row_index(data: &[u8]) -> XlsbResult<u32> {
    let row = FieldReader::new(data).read_u32()?;
    if row > MAX_ROW {
        return Err(XlsbError::InvalidValue {
            field: "row index",
            value: row as u64,
        });
    }
    Ok(row)
}

/// Decode one cell record belonging to `row`.
///
/// The column is mandatory: if it cannot be read the record is rejected. The
/// style and value degrade instead: an unreadable style yields an empty,
/// unstyled cell and an unreadable value yields an empty cell.
pub fn parse_cell(
    record_type: u32,
    data: &[u8],
    row: u32,
    shared_strings: Option<&SharedStrings>,
) -> XlsbResult<Cell> {
    let mut reader = FieldReader::new(data);
    let col = reader.read_u32()?;

    let style = match reader.read_u32() {
        Ok(style) if style > MAX_STYLE => 0,
        Ok(style) => style,
        Err(_) => return Ok(Cell::empty(row, col)),
    };

    let value = read_value(record_type, &mut reader, shared_strings).unwrap_or_default();
    Ok(Cell::new(row, col, value, style))
}

fn read_value(
    record_type: u32,
    reader: &mut FieldReader<'_>,
    shared_strings: Option<&SharedStrings>,
) -> XlsbResult<CellValue> {
    let value = match record_type {
        record_types::NUM => CellValue::Number(reader.read_rk()?),
        record_types::BOOL_ERR | record_types::FORMULA_BOOL_ERR => {
            CellValue::ErrorCode(error_code_name(reader.read_u8()?).into_owned())
        },
        record_types::BOOL | record_types::FORMULA_BOOL => {
            CellValue::Boolean(reader.read_u8()? != 0)
        },
        record_types::FLOAT | record_types::FORMULA_FLOAT => CellValue::Number(reader.read_f64()?),
        record_types::STRING => {
            let idx = reader.read_u32()?;
            match shared_strings.and_then(|sst| sst.get(idx as usize)) {
                Some(s) => CellValue::Text(s.to_string()),
                None => CellValue::Text(format!("<{idx}>")),
            }
        },
        record_types::FORMULA_STRING => CellValue::Text(reader.read_string()?),
        _ => CellValue::Empty,
    };
    Ok(value)
}
