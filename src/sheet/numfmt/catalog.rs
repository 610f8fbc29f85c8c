//! Built-in number formats and style-index resolution

use super::format_value;
use crate::sheet::CellValue;
use phf::phf_map;

/// First number format ID available to custom formats
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// Built-in number format strings.
///
/// IDs 27–36 and 50–58 are locale dependent in Excel; neutral Western date
/// and time patterns stand in for them.
static BUILTIN_FORMATS: phf::Map<u32, &'static str> = phf_map! {
    0u32 => "General",
    1u32 => "0",
    2u32 => "0.00",
    3u32 => "#,##0",
    4u32 => "#,##0.00",
    5u32 => "($#,##0_);($#,##0)",
    6u32 => "($#,##0_);[Red]($#,##0)",
    7u32 => "($#,##0.00_);($#,##0.00)",
    8u32 => "($#,##0.00_);[Red]($#,##0.00)",
    9u32 => "0%",
    10u32 => "0.00%",
    11u32 => "0.00E+00",
    12u32 => "# ?/?",
    13u32 => "# ??/??",
    14u32 => "mm-dd-yy",
    15u32 => "d-mmm-yy",
    16u32 => "d-mmm",
    17u32 => "mmm-yy",
    18u32 => "h:mm AM/PM",
    19u32 => "h:mm:ss AM/PM",
    20u32 => "h:mm",
    21u32 => "h:mm:ss",
    22u32 => "m/d/yy h:mm",
    27u32 => "yyyy/m/d",
    28u32 => "m/d",
    29u32 => "m/d",
    30u32 => "m/d/yy",
    31u32 => "yyyy/m/d",
    32u32 => "h:mm",
    33u32 => "h:mm:ss",
    34u32 => "h:mm AM/PM",
    35u32 => "h:mm:ss AM/PM",
    36u32 => "yyyy/m/d",
    37u32 => "(#,##0_);(#,##0)",
    38u32 => "(#,##0_);[Red](#,##0)",
    39u32 => "(#,##0.00_);(#,##0.00)",
    40u32 => "(#,##0.00_);[Red](#,##0.00)",
    41u32 => "_(* #,##0_);_(* (#,##0);_(* \"-\"_);_(@_)",
    42u32 => "_($* #,##0_);_($* (#,##0);_($* \"-\"_);_(@_)",
    43u32 => "_(* #,##0.00_);_(* (#,##0.00);_(* \"-\"??_);_(@_)",
    44u32 => "_($* #,##0.00_);_($* (#,##0.00);_($* \"-\"??_);_(@_)",
    45u32 => "mm:ss",
    46u32 => "[h]:mm:ss",
    47u32 => "mm:ss.0",
    48u32 => "##0.0E+0",
    49u32 => "@",
    50u32 => "yyyy/m/d",
    51u32 => "m/d",
    52u32 => "yyyy/m",
    53u32 => "m/d",
    54u32 => "m/d",
    55u32 => "h:mm AM/PM",
    56u32 => "h:mm:ss AM/PM",
    57u32 => "yyyy/m",
    58u32 => "m/d",
};

/// Canonical format string of a built-in number format ID
#[inline]
pub fn builtin_format(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS.get(&id).copied()
}

/// Whether a number format shows dates or times.
///
/// Built-in IDs are classified by range. For custom IDs the format string is
/// scanned outside quoted text, brackets and escapes for `d`, `m`, `y`, `h`
/// or `s`. An `e` counts as an era token only when no `0`, `#`, `?` or `.`
/// came before it; otherwise it is an exponent marker.
///
/// # Examples
///
/// ```
/// use binsheet::sheet::numfmt::is_date_format;
///
/// assert!(is_date_format(14, ""));
/// assert!(!is_date_format(2, ""));
/// assert!(is_date_format(164, "yyyy-mm-dd"));
/// assert!(!is_date_format(164, "0.00E+00"));
/// ```
pub fn is_date_format(id: u32, format: &str) -> bool {
    match id {
        14..=22 | 27..=36 | 45..=47 | 50..=58 => return true,
        _ if id < FIRST_CUSTOM_FORMAT_ID => return false,
        _ => {},
    }

    if format.eq_ignore_ascii_case("general") {
        return false;
    }

    let chars: Vec<char> = format.chars().collect();
    let mut seen_placeholder = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '"' => {
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    i += 1;
                }
            },
            '[' => {
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
            },
            '\\' | '_' | '*' => i += 1,
            'G' | 'g'
                if chars
                    .get(i..i + 7)
                    .is_some_and(|w| w.iter().collect::<String>().eq_ignore_ascii_case("general")) =>
            {
                i += 6;
            },
            '0' | '#' | '?' | '.' => seen_placeholder = true,
            'd' | 'D' | 'm' | 'M' | 'y' | 'Y' | 'h' | 'H' | 's' | 'S' => return true,
            'e' | 'E' if !seen_placeholder => return true,
            _ => {},
        }
        i += 1;
    }
    false
}

/// Number format of one cell style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleEntry {
    pub num_fmt_id: u32,
    /// Custom format string; empty for built-in formats
    pub format_code: String,
}

impl StyleEntry {
    pub fn new(num_fmt_id: u32, format_code: impl Into<String>) -> Self {
        StyleEntry {
            num_fmt_id,
            format_code: format_code.into(),
        }
    }

    /// Whether this style shows dates or times
    pub fn is_date(&self) -> bool {
        is_date_format(self.num_fmt_id, &self.format_code)
    }
}

/// Style-index lookup of number formats for one workbook
#[derive(Debug, Clone, Default)]
pub struct FormatCatalog {
    styles: Vec<StyleEntry>,
}

impl FormatCatalog {
    pub fn new(styles: Vec<StyleEntry>) -> Self {
        FormatCatalog { styles }
    }

    /// Style entry at `style_index`, or `None` past the end of the table
    #[inline]
    pub fn get(&self, style_index: u32) -> Option<&StyleEntry> {
        self.styles.get(style_index as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Whether cells with this style hold dates or times
    pub fn is_date_style(&self, style_index: u32) -> bool {
        self.get(style_index).is_some_and(StyleEntry::is_date)
    }

    /// Render a cell value with the number format of its style.
    ///
    /// An unknown style index renders with General.
    ///
    /// # Examples
    ///
    /// ```
    /// use binsheet::sheet::CellValue;
    /// use binsheet::sheet::numfmt::{FormatCatalog, StyleEntry};
    ///
    /// let catalog = FormatCatalog::new(vec![
    ///     StyleEntry::new(0, ""),
    ///     StyleEntry::new(10, ""),
    /// ]);
    /// assert_eq!(catalog.format_cell(&CellValue::Number(0.1234), 1, false), "12.34%");
    /// assert_eq!(catalog.format_cell(&CellValue::Number(0.5), 9, false), "0.5");
    /// ```
    pub fn format_cell(&self, value: &CellValue, style_index: u32, date1904: bool) -> String {
        match self.get(style_index) {
            Some(style) => format_value(value, style.num_fmt_id, &style.format_code, date1904),
            None => format_value(value, 0, "", date1904),
        }
    }
}

impl FromIterator<StyleEntry> for FormatCatalog {
    fn from_iter<I: IntoIterator<Item = StyleEntry>>(iter: I) -> Self {
        FormatCatalog::new(iter.into_iter().collect())
    }
}
