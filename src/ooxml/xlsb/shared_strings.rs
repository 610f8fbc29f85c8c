//! Shared string table (`xl/sharedStrings.bin`)

use crate::common::binary::FieldReader;
use crate::ooxml::xlsb::error::XlsbResult;
use crate::ooxml::xlsb::records::{RecordStream, record_types};
use bytes::Bytes;
use std::io::Cursor;

/// Rich-text run count follows the flags
const FLAG_RICH: u8 = 0x01;
/// Phonetic data size follows the flags
const FLAG_PHONETIC: u8 = 0x02;

/// Shared strings referenced by index from string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Decode a shared-string part.
    ///
    /// Framing errors are fatal. A malformed string entry keeps its slot as an
    /// empty string so later indices stay aligned.
    pub fn parse(data: impl Into<Bytes>) -> XlsbResult<Self> {
        let mut strings = Vec::new();
        let mut malformed = 0usize;

        for record in RecordStream::new(Cursor::new(data.into())) {
            let record = record?;
            match record.record_type {
                record_types::SI => match parse_si(&record.data) {
                    Ok(s) => strings.push(s),
                    Err(_) => {
                        malformed += 1;
                        strings.push(String::new());
                    },
                },
                record_types::SST_END => break,
                _ => {},
            }
        }

        if malformed > 0 {
            log::warn!("{malformed} malformed shared string entries replaced by empty strings");
        }
        log::debug!("loaded {} shared strings", strings.len());
        Ok(SharedStrings { strings })
    }

    /// Build a table from already decoded strings
    pub fn from_strings(strings: Vec<String>) -> Self {
        SharedStrings { strings }
    }

    /// String at `index`, if present
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Decode one string-item payload: flags, optional run count and phonetic
/// size, then the string. Trailing run and phonetic data is ignored.
fn parse_si(data: &[u8]) -> XlsbResult<String> {
    if data.is_empty() {
        return Ok(String::new());
    }
    let mut reader = FieldReader::new(data);
    let flags = reader.read_u8()?;
    if flags & FLAG_RICH != 0 {
        reader.skip(4)?;
    }
    if flags & FLAG_PHONETIC != 0 {
        reader.skip(4)?;
    }
    Ok(reader.read_string()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsb::records::test_support::{record, wide};

    fn si(flags: u8, text: &str) -> Vec<u8> {
        let mut payload = vec![flags];
        if flags & FLAG_RICH != 0 {
            payload.extend_from_slice(&2u32.to_le_bytes());
        }
        if flags & FLAG_PHONETIC != 0 {
            payload.extend_from_slice(&12u32.to_le_bytes());
        }
        payload.extend(wide(text));
        record(record_types::SI, &payload)
    }

    #[test]
    fn test_parse_plain_and_flagged_entries() {
        let mut data = record(record_types::SST, &[0u8; 8]);
        data.extend(si(0, "alpha"));
        data.extend(si(FLAG_RICH, "beta"));
        data.extend(si(FLAG_RICH | FLAG_PHONETIC, "gamma"));
        data.extend(record(record_types::SST_END, &[]));

        let sst = SharedStrings::parse(data).unwrap();
        assert_eq!(sst.len(), 3);
        assert_eq!(sst.get(0), Some("alpha"));
        assert_eq!(sst.get(1), Some("beta"));
        assert_eq!(sst.get(2), Some("gamma"));
        assert_eq!(sst.get(3), None);
    }

    #[test]
    fn test_malformed_entry_keeps_slot() {
        let mut data = si(0, "first");
        // Flags announce a run count that is missing
        data.extend(record(record_types::SI, &[FLAG_RICH]));
        data.extend(record(record_types::SI, &[]));
        data.extend(si(0, "last"));

        let sst = SharedStrings::parse(data).unwrap();
        assert_eq!(sst.len(), 4);
        assert_eq!(sst.get(1), Some(""));
        assert_eq!(sst.get(2), Some(""));
        assert_eq!(sst.get(3), Some("last"));
    }

    #[test]
    fn test_stops_at_table_end() {
        let mut data = si(0, "kept");
        data.extend(record(record_types::SST_END, &[]));
        data.extend(si(0, "ignored"));
        let sst = SharedStrings::parse(data).unwrap();
        assert_eq!(sst.len(), 1);
    }

    #[test]
    fn test_truncated_stream_is_error() {
        let mut data = si(0, "text");
        data.truncate(data.len() - 1);
        assert!(SharedStrings::parse(data).is_err());
    }
}
