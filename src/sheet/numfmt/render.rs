//! Section selection and mode dispatch

use super::datetime::render_datetime;
use super::fraction::render_fraction;
use super::general::format_general;
use super::number::{render_number, render_scientific};
use super::parser::{FormatSection, ParsedFormat};
use super::tokens::FormatToken;
use crate::sheet::CellValue;

/// How a section renders numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Number,
    Scientific,
    Fraction,
    DateTime,
}

impl Mode {
    fn of(section: &FormatSection) -> Self {
        if section.has_datetime() {
            Mode::DateTime
        } else if section
            .tokens
            .iter()
            .any(|t| matches!(t, FormatToken::Exponential(_)))
        {
            Mode::Scientific
        } else if section.tokens.contains(&FormatToken::Fraction) {
            Mode::Fraction
        } else {
            Mode::Number
        }
    }
}

/// The section chosen for a number, and whether a minus sign is prepended
struct Selection<'f> {
    section: &'f FormatSection,
    minus: bool,
}

impl ParsedFormat {
    /// Render a cell value. Never fails; unusable formats degrade to General.
    pub fn format(&self, value: &CellValue, date1904: bool) -> String {
        match value {
            CellValue::Empty => String::new(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
            CellValue::ErrorCode(code) => code.clone(),
            CellValue::Text(text) => self.format_text(text),
            CellValue::Number(n) => self.format_number(*n, date1904),
        }
    }

    /// Render text through the fourth section, or through a first section
    /// with a `@` placeholder. Otherwise the text is returned unchanged.
    pub fn format_text(&self, text: &str) -> String {
        let section = self
            .sections
            .get(3)
            .or_else(|| self.sections.first().filter(|s| s.has_text_placeholder()));
        match section {
            Some(section) => render_text(section, text),
            None => text.to_string(),
        }
    }

    /// Render a number through the section its sign or condition selects
    pub fn format_number(&self, value: f64, date1904: bool) -> String {
        if !value.is_finite() {
            return format_general(value);
        }
        let Some(Selection { section, minus }) = self.select(value) else {
            return format_general(value);
        };
        if section.is_empty() {
            return String::new();
        }

        let mut out = match Mode::of(section) {
            Mode::DateTime => {
                return render_datetime(section, value, date1904)
                    .unwrap_or_else(|| format_general(value));
            },
            Mode::Scientific => render_scientific(section, value.abs()),
            Mode::Fraction => render_fraction(section, value.abs()),
            Mode::Number => render_number(section, value.abs()),
        };

        // A section of bare decorations such as `[Red]` shows the value itself
        if out.is_empty()
            && !section
                .tokens
                .iter()
                .any(|t| t.is_literal() || t.is_digit_placeholder())
        {
            return format_general(value);
        }
        if minus {
            out.insert(0, '-');
        }
        out
    }

    fn select(&self, value: f64) -> Option<Selection<'_>> {
        let sections = &self.sections;
        let negative = value < 0.0;

        if self.has_conditions() {
            let section = sections
                .iter()
                .find(|s| {
                    s.condition()
                        .is_some_and(|(op, operand)| op.matches(value, operand))
                })
                .or_else(|| sections.iter().rev().find(|s| s.condition().is_none()))
                .or_else(|| sections.last())?;
            // The condition carries the sign; the section shows the magnitude
            return Some(Selection {
                section,
                minus: false,
            });
        }

        // Only a lone section gets a minus; an explicit negative section
        // displays its own sign, if any
        let (index, minus) = match sections.len() {
            0 => return None,
            1 => (0, negative && !sections[0].has_sign_literal()),
            2 if negative => (1, false),
            2 => (0, false),
            _ if value > 0.0 => (0, false),
            _ if negative => (1, false),
            _ => (2, false),
        };
        Some(Selection {
            section: &sections[index],
            minus,
        })
    }
}

fn render_text(section: &FormatSection, text: &str) -> String {
    let mut out = String::new();
    for token in &section.tokens {
        match token {
            FormatToken::TextPlaceholder => out.push_str(text),
            FormatToken::Literal(s) | FormatToken::CurrencyLanguage(s) => out.push_str(s),
            FormatToken::Alignment(_) => out.push(' '),
            FormatToken::RepeatChar(c) => out.push(*c),
            _ => {},
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(format: &str, value: f64) -> String {
        ParsedFormat::parse(format).format_number(value, false)
    }

    fn text(format: &str, value: &str) -> String {
        ParsedFormat::parse(format).format_text(value)
    }

    #[test]
    fn test_sign_dispatch() {
        assert_eq!(number("0.0", -1.5), "-1.5");
        assert_eq!(number("0;(0)", -5.0), "(5)");
        assert_eq!(number("0;0", -5.0), "5");
        assert_eq!(number("0.00;[Red]0.00", -5.0), "5.00");
        assert_eq!(number("0;0;0", -5.0), "5");
        assert_eq!(number("0;0;0", 0.0), "0");
        assert_eq!(number("0;(0);\"zero\"", 0.0), "zero");
        assert_eq!(number("0;(0);\"zero\"", 3.0), "3");
        assert_eq!(number("0;-0;0;@", -2.0), "-2");
    }

    #[test]
    fn test_lone_section_sign_wrapper() {
        assert_eq!(number("(0)", -5.0), "(5)");
        assert_eq!(number("(0)", 5.0), "(5)");
        assert_eq!(number(r"0\-", -5.0), "5-");
    }

    #[test]
    fn test_empty_sections_hide_values() {
        assert_eq!(number("0;;0", -5.0), "");
        assert_eq!(number(";;;", 5.0), "");
    }

    #[test]
    fn test_conditions() {
        let format = "[>=100]\"big \"0;[<0]\"neg \"0;\"small \"0";
        assert_eq!(number(format, 150.0), "big 150");
        assert_eq!(number(format, -3.0), "neg 3");
        assert_eq!(number("[<0]\"neg \"0;0", -3.0), "neg 3");
        // The fallback section under conditions also shows the magnitude
        assert_eq!(number("[>10]0;0", -4.0), "4");
        assert_eq!(number(format, 7.0), "small 7");
        // No match and no condition-free section: the last section is used
        assert_eq!(number("[>10]0;[<-10]0.0", 5.0), "5.0");
    }

    #[test]
    fn test_bare_decorations_fall_back_to_general() {
        assert_eq!(number("[Red]", 42.5), "42.5");
        assert_eq!(number("[Red]", -42.5), "-42.5");
        assert_eq!(number("\"\"", 42.5), "");
    }

    #[test]
    fn test_text_sections() {
        assert_eq!(text("0;0;0;\"<\"@\">\"", "abc"), "<abc>");
        assert_eq!(text("@\" kg\"", "5"), "5 kg");
        assert_eq!(text("0.00", "plain"), "plain");
        assert_eq!(text("_(@_)", "x"), " x ");
    }

    #[test]
    fn test_text_placeholder_on_number() {
        assert_eq!(number("@", 12.5), "12.5");
    }

    #[test]
    fn test_non_finite_numbers() {
        assert_eq!(number("0.00", f64::NAN), "NaN");
    }

    #[test]
    fn test_other_values() {
        let parsed = ParsedFormat::parse("0.00");
        assert_eq!(parsed.format(&CellValue::Empty, false), "");
        assert_eq!(parsed.format(&CellValue::Boolean(true), false), "TRUE");
        assert_eq!(
            parsed.format(&CellValue::ErrorCode("#N/A".into()), false),
            "#N/A"
        );
    }
}
