//! Hyperlink support for XLSB
//!
//! A hyperlink record stores a cell range and the relationship ID of its
//! target. The target URL itself lives in the worksheet's relationship part,
//! which is decoded elsewhere and handed to the scanner as an ID → target map.

use crate::common::binary::FieldReader;
use crate::ooxml::xlsb::error::XlsbResult;
use crate::ooxml::xlsb::utils::RangeRef;
use std::collections::HashMap;

/// Hyperlink covering an inclusive cell range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// Covered cells
    pub range: RangeRef,
    /// Relationship ID (points to the external target)
    pub r_id: String,
    /// Resolved target, if the relationship map knows the ID
    pub target: Option<String>,
}

impl Hyperlink {
    /// Parse from a hyperlink record payload.
    ///
    /// Ranges ending past the last sheet row or column are rejected.
    pub fn parse(data: &[u8]) -> XlsbResult<Self> {
        let mut reader = FieldReader::new(data);
        let range = RangeRef::read(&mut reader)?.within_sheet()?;
        let r_id = reader.read_string()?;
        Ok(Hyperlink {
            range,
            r_id,
            target: None,
        })
    }

    /// Attach the target from a relationship map
    pub fn with_target(mut self, rels: &HashMap<String, String>) -> Self {
        self.target = rels.get(&self.r_id).cloned();
        self
    }

    #[inline]
    fn covers(&self, row: u32, col: u32) -> bool {
        (self.range.row_first..=self.range.row_last).contains(&row)
            && (self.range.col_first..=self.range.col_last).contains(&col)
    }
}

/// Cell coordinate → relationship ID lookup.
///
/// Ranges are kept as ranges rather than expanded per cell. When ranges
/// overlap, the record that appeared last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HyperlinkMap {
    links: Vec<Hyperlink>,
}

impl HyperlinkMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, link: Hyperlink) {
        self.links.push(link);
    }

    /// Hyperlink covering `(row, col)`
    pub fn get(&self, row: u32, col: u32) -> Option<&Hyperlink> {
        self.links.iter().rev().find(|link| link.covers(row, col))
    }

    /// Relationship ID for `(row, col)`
    pub fn relationship_id(&self, row: u32, col: u32) -> Option<&str> {
        self.get(row, col).map(|link| link.r_id.as_str())
    }

    /// Resolved target for `(row, col)`
    pub fn target(&self, row: u32, col: u32) -> Option<&str> {
        self.get(row, col).and_then(|link| link.target.as_deref())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hyperlink> {
        self.links.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsb::records::test_support::{range, wide};

    fn link_record(r1: u32, r2: u32, c1: u32, c2: u32, r_id: &str) -> Vec<u8> {
        let mut data = range(r1, r2, c1, c2);
        data.extend(wide(r_id));
        data
    }

    #[test]
    fn test_parse_hyperlink() {
        let link = Hyperlink::parse(&link_record(0, 1, 0, 0, "rId3")).unwrap();
        assert_eq!(link.r_id, "rId3");
        assert_eq!(link.range.height(), 2);
        assert_eq!(link.target, None);
    }

    #[test]
    fn test_reject_out_of_sheet_range() {
        assert!(Hyperlink::parse(&link_record(0, 0x10_0000, 0, 0, "rId1")).is_err());
        assert!(Hyperlink::parse(&link_record(0, 0, 2, 1, "rId1")).is_err());
        // Missing relationship ID
        assert!(Hyperlink::parse(&range(0, 0, 0, 0)).is_err());
    }

    #[test]
    fn test_map_lookup_every_covered_cell() {
        let rels = HashMap::from([("rId1".to_string(), "https://example.com".to_string())]);
        let mut map = HyperlinkMap::new();
        map.insert(
            Hyperlink::parse(&link_record(1, 2, 1, 2, "rId1"))
                .unwrap()
                .with_target(&rels),
        );

        for (r, c) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            assert_eq!(map.relationship_id(r, c), Some("rId1"));
            assert_eq!(map.target(r, c), Some("https://example.com"));
        }
        assert_eq!(map.relationship_id(0, 0), None);
        assert_eq!(map.relationship_id(3, 2), None);
    }

    #[test]
    fn test_later_record_wins() {
        let mut map = HyperlinkMap::new();
        map.insert(Hyperlink::parse(&link_record(0, 5, 0, 5, "rId1")).unwrap());
        map.insert(Hyperlink::parse(&link_record(2, 2, 2, 2, "rId2")).unwrap());
        assert_eq!(map.relationship_id(2, 2), Some("rId2"));
        assert_eq!(map.relationship_id(1, 1), Some("rId1"));
    }
}
