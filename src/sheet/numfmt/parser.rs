//! Format string tokenizer
//!
//! Splits a format string into at most four `;`-separated sections and each
//! section into [`FormatToken`]s. Tokenizing never fails: anything that is
//! not recognized becomes a literal.

use super::tokens::{ConditionOp, FormatToken};
use smallvec::SmallVec;

/// Excel reads at most four sections; anything after the fourth `;` is dropped
pub const MAX_SECTIONS: usize = 4;

const COLOR_NAMES: [&str; 8] = [
    "black", "blue", "cyan", "green", "magenta", "red", "white", "yellow",
];

/// Tokens of one section, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatSection {
    pub tokens: Vec<FormatToken>,
}

impl FormatSection {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The section's condition, if it has one
    pub fn condition(&self) -> Option<(ConditionOp, f64)> {
        self.tokens.iter().find_map(|t| match *t {
            FormatToken::Condition(op, operand) => Some((op, operand)),
            _ => None,
        })
    }

    pub fn has_datetime(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_datetime)
    }

    pub fn has_digit_placeholder(&self) -> bool {
        self.tokens.iter().any(FormatToken::is_digit_placeholder)
    }

    pub fn has_text_placeholder(&self) -> bool {
        self.tokens.contains(&FormatToken::TextPlaceholder)
    }

    /// Whether a literal already spells out the sign, e.g. `(0)` or `-0`
    pub fn has_sign_literal(&self) -> bool {
        self.tokens.iter().any(|t| match t {
            FormatToken::Literal(s) => s.contains(['(', ')', '+', '-']),
            _ => false,
        })
    }

    fn push(&mut self, token: FormatToken) {
        self.tokens.push(token);
    }

    /// Append literal text, merging with a preceding literal
    fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(FormatToken::Literal(last)) = self.tokens.last_mut() {
            last.push_str(text);
        } else {
            self.tokens.push(FormatToken::Literal(text.to_string()));
        }
    }

    fn push_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.push_literal(c.encode_utf8(&mut buf));
    }
}

/// A tokenized format string with one to four sections
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormat {
    pub sections: SmallVec<[FormatSection; MAX_SECTIONS]>,
}

impl ParsedFormat {
    /// Tokenize `format`.
    ///
    /// # Examples
    ///
    /// ```
    /// use binsheet::sheet::numfmt::{FormatToken, ParsedFormat};
    ///
    /// let parsed = ParsedFormat::parse("#,##0.00;[Red](#,##0.00)");
    /// assert_eq!(parsed.sections.len(), 2);
    /// assert_eq!(parsed.sections[0].tokens[0], FormatToken::DigitHash(1));
    /// ```
    pub fn parse(format: &str) -> Self {
        let chars: Vec<char> = format.chars().collect();
        let mut sections = SmallVec::new();
        let mut section = FormatSection::default();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                ';' => {
                    sections.push(std::mem::take(&mut section));
                    if sections.len() == MAX_SECTIONS {
                        break;
                    }
                    i += 1;
                },
                '"' => {
                    let end = find(&chars, i + 1, '"').unwrap_or(chars.len());
                    let text: String = chars[i + 1..end].iter().collect();
                    section.push_literal(&text);
                    i = end + 1;
                },
                '\\' => {
                    if let Some(&next) = chars.get(i + 1) {
                        section.push_char(next);
                    }
                    i += 2;
                },
                '_' | '*' => {
                    if let Some(&next) = chars.get(i + 1) {
                        section.push(if c == '_' {
                            FormatToken::Alignment(next)
                        } else {
                            FormatToken::RepeatChar(next)
                        });
                    }
                    i += 2;
                },
                '[' => match find(&chars, i + 1, ']') {
                    Some(end) => {
                        let content: String = chars[i + 1..end].iter().collect();
                        if let Some(token) = parse_bracket(&content) {
                            section.push(token);
                        }
                        i = end + 1;
                    },
                    None => {
                        section.push_char(c);
                        i += 1;
                    },
                },
                '0' | '#' | '?' => {
                    let n = run_length(&chars, i, |x| x == c);
                    section.push(match c {
                        '0' => FormatToken::DigitZero(n),
                        '#' => FormatToken::DigitHash(n),
                        _ => FormatToken::DigitQuestion(n),
                    });
                    i += n;
                },
                '.' => {
                    section.push(FormatToken::DecimalPoint);
                    i += 1;
                },
                ',' => {
                    section.push(FormatToken::ThousandsSep);
                    i += 1;
                },
                '%' => {
                    section.push(FormatToken::Percent);
                    i += 1;
                },
                '@' => {
                    section.push(FormatToken::TextPlaceholder);
                    i += 1;
                },
                '/' => i = parse_slash(&chars, i, &mut section),
                'E' | 'e'
                    if matches!(chars.get(i + 1), Some('+' | '-'))
                        && section.has_digit_placeholder() =>
                {
                    section.push(FormatToken::Exponential(chars[i..i + 2].iter().collect()));
                    i += 2;
                },
                _ if matches_keyword(&chars, i, "general") => {
                    section.push(FormatToken::General);
                    i += "general".len();
                },
                _ if matches_keyword(&chars, i, "am/pm") || matches_keyword(&chars, i, "a/p") => {
                    let len = if matches_keyword(&chars, i, "am/pm") { 5 } else { 3 };
                    section.push(FormatToken::DateTime(chars[i..i + len].iter().collect()));
                    i += len;
                },
                '上' if matches_keyword(&chars, i, "上午/下午") => {
                    section.push(FormatToken::DateTime("上午/下午".to_string()));
                    i += 5;
                },
                'B' | 'b' if matches!(chars.get(i + 1), Some('1' | '2')) => {
                    section.push(FormatToken::DateTime(chars[i..i + 2].iter().collect()));
                    i += 2;
                },
                _ if is_date_letter(c) => {
                    let lower = c.to_ascii_lowercase();
                    let n = run_length(&chars, i, |x| x.to_ascii_lowercase() == lower);
                    section.push(FormatToken::DateTime(chars[i..i + n].iter().collect()));
                    i += n;
                },
                _ => {
                    section.push_char(c);
                    i += 1;
                },
            }
        }

        if sections.len() < MAX_SECTIONS {
            sections.push(section);
        }
        ParsedFormat { sections }
    }

    /// Whether any section carries a condition
    pub fn has_conditions(&self) -> bool {
        self.sections.iter().any(|s| s.condition().is_some())
    }
}

fn find(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars
        .get(from..)?
        .iter()
        .position(|&c| c == target)
        .map(|p| from + p)
}

fn run_length(chars: &[char], from: usize, same: impl Fn(char) -> bool) -> usize {
    chars[from..].iter().take_while(|&&c| same(c)).count()
}

fn matches_keyword(chars: &[char], at: usize, keyword: &str) -> bool {
    let mut i = at;
    for k in keyword.chars() {
        match chars.get(i) {
            Some(c) if c.to_lowercase().eq(k.to_lowercase()) => i += 1,
            _ => return false,
        }
    }
    true
}

fn is_date_letter(c: char) -> bool {
    matches!(
        c.to_ascii_lowercase(),
        'y' | 'm' | 'd' | 'h' | 's' | 'e' | 'g'
    )
}

/// A `/` is a fraction bar only after a digit placeholder in a section with
/// no date tokens. Digits right after it form a fixed denominator.
fn parse_slash(chars: &[char], at: usize, section: &mut FormatSection) -> usize {
    if !section.has_digit_placeholder() || section.has_datetime() {
        section.push_char('/');
        return at + 1;
    }
    section.push(FormatToken::Fraction);

    let start = at + 1;
    if matches!(chars.get(start), Some('1'..='9')) {
        let n = run_length(chars, start, |c| c.is_ascii_digit());
        let digits: String = chars[start..start + n].iter().collect();
        if let Ok(denominator) = digits.parse::<u32>() {
            section.push(FormatToken::Denominator(denominator));
            return start + n;
        }
    }
    start
}

/// Interpret the text between `[` and `]`. Unknown content is dropped.
fn parse_bracket(content: &str) -> Option<FormatToken> {
    if let Some(rest) = content.strip_prefix('$') {
        let symbol = rest.split('-').next().unwrap_or_default();
        return Some(FormatToken::CurrencyLanguage(symbol.to_string()));
    }

    if content.starts_with(['<', '>', '=']) {
        return parse_condition(content);
    }

    let lower = content.to_ascii_lowercase();
    if let Some(first) = lower.chars().next()
        && matches!(first, 'h' | 'm' | 's')
        && lower.chars().all(|c| c == first)
    {
        return Some(FormatToken::ElapsedDateTime(content.to_string()));
    }

    if COLOR_NAMES.contains(&lower.as_str()) || lower.starts_with("color") {
        return Some(FormatToken::Color);
    }
    None
}

fn parse_condition(content: &str) -> Option<FormatToken> {
    let (op, operand) = [
        ("<=", ConditionOp::Le),
        (">=", ConditionOp::Ge),
        ("<>", ConditionOp::Ne),
        ("<", ConditionOp::Lt),
        (">", ConditionOp::Gt),
        ("=", ConditionOp::Eq),
    ]
    .into_iter()
    .find_map(|(prefix, op)| content.strip_prefix(prefix).map(|rest| (op, rest)))?;

    let operand = operand.trim().parse::<f64>().ok()?;
    Some(FormatToken::Condition(op, operand))
}

#[cfg(test)]
mod tests {
    use super::*;
    use FormatToken::*;

    fn tokens(format: &str) -> Vec<FormatToken> {
        let parsed = ParsedFormat::parse(format);
        assert_eq!(parsed.sections.len(), 1, "{format}");
        parsed.sections[0].tokens.clone()
    }

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(
            tokens("#,##0.00%"),
            vec![
                DigitHash(1),
                ThousandsSep,
                DigitHash(2),
                DigitZero(1),
                DecimalPoint,
                DigitZero(2),
                Percent
            ]
        );
    }

    #[test]
    fn test_literals_merge() {
        assert_eq!(
            tokens("\"Total: \"0\\ \"units\""),
            vec![Literal("Total: ".into()), DigitZero(1), Literal(" units".into())]
        );
        assert_eq!(tokens("$0"), vec![Literal("$".into()), DigitZero(1)]);
    }

    #[test]
    fn test_sections_split_outside_quotes() {
        let parsed = ParsedFormat::parse("0;\"a;b\"0;0;@;extra");
        assert_eq!(parsed.sections.len(), 4);
        assert_eq!(parsed.sections[1].tokens[0], Literal("a;b".into()));
        assert_eq!(parsed.sections[3].tokens, vec![TextPlaceholder]);
    }

    #[test]
    fn test_empty_sections_kept() {
        let parsed = ParsedFormat::parse("0;;0");
        assert_eq!(parsed.sections.len(), 3);
        assert!(parsed.sections[1].is_empty());
    }

    #[test]
    fn test_brackets() {
        assert_eq!(
            tokens("[Red][>=100][$€-407]0"),
            vec![
                Color,
                Condition(ConditionOp::Ge, 100.0),
                CurrencyLanguage("€".into()),
                DigitZero(1)
            ]
        );
        assert_eq!(
            tokens("[h]:mm:ss"),
            vec![
                ElapsedDateTime("h".into()),
                Literal(":".into()),
                DateTime("mm".into()),
                Literal(":".into()),
                DateTime("ss".into())
            ]
        );
        assert_eq!(tokens("[Color10][DBNum1]0"), vec![Color, DigitZero(1)]);
    }

    #[test]
    fn test_fraction_and_denominator() {
        assert_eq!(
            tokens("# ?/?"),
            vec![
                DigitHash(1),
                Literal(" ".into()),
                DigitQuestion(1),
                Fraction,
                DigitQuestion(1)
            ]
        );
        assert_eq!(tokens("?/16"), vec![DigitQuestion(1), Fraction, Denominator(16)]);
        // No placeholder before the slash, and date sections keep it literal
        assert_eq!(tokens("/0"), vec![Literal("/".into()), DigitZero(1)]);
        assert_eq!(
            tokens("m/d"),
            vec![DateTime("m".into()), Literal("/".into()), DateTime("d".into())]
        );
    }

    #[test]
    fn test_exponent_vs_era() {
        assert_eq!(
            tokens("0.00E+00"),
            vec![
                DigitZero(1),
                DecimalPoint,
                DigitZero(2),
                Exponential("E+".into()),
                DigitZero(2)
            ]
        );
        assert_eq!(tokens("ee"), vec![DateTime("ee".into())]);
    }

    #[test]
    fn test_meridiem_and_calendar_tokens() {
        assert_eq!(
            tokens("h AM/PM"),
            vec![DateTime("h".into()), Literal(" ".into()), DateTime("AM/PM".into())]
        );
        assert_eq!(tokens("a/p"), vec![DateTime("a/p".into())]);
        assert_eq!(tokens("上午/下午"), vec![DateTime("上午/下午".into())]);
        assert_eq!(tokens("B2gg"), vec![DateTime("B2".into()), DateTime("gg".into())]);
    }

    #[test]
    fn test_general_keyword_and_alignment() {
        assert_eq!(
            tokens("_(General*x"),
            vec![Alignment('('), General, RepeatChar('x')]
        );
    }

    #[test]
    fn test_sign_literal_detection() {
        let parsed = ParsedFormat::parse("0;(0)");
        assert!(!parsed.sections[0].has_sign_literal());
        assert!(parsed.sections[1].has_sign_literal());
    }

    #[test]
    fn test_unterminated_constructs() {
        assert_eq!(tokens("0\"abc"), vec![DigitZero(1), Literal("abc".into())]);
        assert_eq!(
            tokens("[Red"),
            vec![Literal("[R".into()), DateTime("e".into()), DateTime("d".into())]
        );
    }
}
