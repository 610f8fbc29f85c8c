//! Fixed-point and scientific rendering
//!
//! Both modes receive the value's magnitude; the caller decides whether a
//! minus sign is prepended.

use super::general::format_general;
use super::parser::FormatSection;
use super::tokens::FormatToken;

/// Placeholder layout of the mantissa part of a section
#[derive(Debug, Default)]
struct Layout {
    /// Integer placeholders, one char per digit position
    int_slots: Vec<char>,
    /// Fraction placeholders, one char per digit position
    frac_slots: Vec<char>,
    /// Token index of the decimal point
    decimal: Option<usize>,
    grouping: bool,
    /// Commas right after the last placeholder, each dividing by 1000
    scale_commas: usize,
    percent: usize,
    /// Literals sit between integer placeholders, e.g. `000-00-0000`
    interleaved: bool,
}

impl Layout {
    fn new(tokens: &[FormatToken]) -> Self {
        let decimal = tokens.iter().position(|t| *t == FormatToken::DecimalPoint);
        let mut layout = Layout {
            decimal,
            ..Layout::default()
        };

        for (i, token) in tokens.iter().enumerate() {
            if let Some((c, n)) = token.placeholder() {
                let slots = if decimal.is_some_and(|d| i > d) {
                    &mut layout.frac_slots
                } else {
                    &mut layout.int_slots
                };
                slots.extend(std::iter::repeat_n(c, n));
            }
        }

        if let Some(last) = tokens.iter().rposition(FormatToken::is_digit_placeholder) {
            layout.scale_commas = tokens[last + 1..]
                .iter()
                .take_while(|t| **t == FormatToken::ThousandsSep)
                .count();
            layout.grouping = tokens[..last].contains(&FormatToken::ThousandsSep);
        }
        layout.percent = tokens.iter().filter(|t| **t == FormatToken::Percent).count();

        let int_end = decimal.unwrap_or(tokens.len());
        let int_tokens = &tokens[..int_end];
        if let (Some(first), Some(last)) = (
            int_tokens.iter().position(FormatToken::is_digit_placeholder),
            int_tokens.iter().rposition(FormatToken::is_digit_placeholder),
        ) {
            layout.interleaved = int_tokens[first..=last]
                .iter()
                .any(|t| !t.is_digit_placeholder() && *t != FormatToken::ThousandsSep);
        }
        layout
    }

    #[inline]
    fn is_fraction_index(&self, index: usize) -> bool {
        self.decimal.is_some_and(|d| index > d)
    }
}

/// Rendered digit groups, ready to be placed by the token walk
struct Digits {
    /// Text for each integer slot. Without interleaving the whole block sits
    /// in the first entry.
    integer: Vec<String>,
    /// Fraction digits, or `None` when the point itself is dropped
    fraction: Option<String>,
}

impl Digits {
    fn new(layout: &Layout, value: f64) -> Self {
        let decimals = layout.frac_slots.len();
        let rounded = round_to(value, decimals);
        let text = format!("{rounded:.decimals$}");
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let int_part = if int_part == "0" && layout.int_slots.last() != Some(&'0') {
            ""
        } else {
            int_part
        };

        let integer = if layout.int_slots.is_empty() {
            vec![int_part.to_string()]
        } else if layout.interleaved {
            interleave(&layout.int_slots, int_part)
        } else {
            let mut slots = vec![String::new(); layout.int_slots.len()];
            slots[0] = pad_integer(&layout.int_slots, int_part, layout.grouping);
            slots
        };

        Digits {
            integer,
            fraction: trim_fraction_digits(&layout.frac_slots, frac_part),
        }
    }
}

/// Right-align `digits` in `slots`: `0` pads with zeros, `?` with spaces and
/// `#` with nothing. Digits beyond the slot count are kept.
pub(crate) fn pad_integer(slots: &[char], digits: &str, grouping: bool) -> String {
    let pads = &slots[..slots.len().saturating_sub(digits.len())];
    let zeros = pads.iter().filter(|&&c| c == '0').count();
    let spaces = pads.iter().filter(|&&c| c == '?').count();

    let mut body = "0".repeat(zeros);
    body.push_str(digits);
    if grouping {
        body = group_thousands(&body);
    }
    let mut out = " ".repeat(spaces);
    out.push_str(&body);
    out
}

/// One digit per slot from the right; the leftmost slot takes any overflow
fn interleave(slots: &[char], digits: &str) -> Vec<String> {
    let digits: Vec<char> = digits.chars().collect();
    let mut remaining = digits.len();
    let mut out = vec![String::new(); slots.len()];

    for (j, slot) in slots.iter().enumerate().rev() {
        if remaining > 0 {
            remaining -= 1;
            out[j].push(digits[remaining]);
        } else {
            match slot {
                '0' => out[j].push('0'),
                '?' => out[j].push(' '),
                _ => {},
            }
        }
    }
    if remaining > 0
        && let Some(first) = out.first_mut()
    {
        let overflow: String = digits[..remaining].iter().collect();
        first.insert_str(0, &overflow);
    }
    out
}

/// Trailing zeros in `#` positions are dropped and in `?` positions become
/// spaces. The point goes away only when every fraction digit was dropped.
fn trim_fraction_digits(slots: &[char], digits: &str) -> Option<String> {
    let digits: Vec<char> = digits.chars().collect();
    let mut end = digits.len().min(slots.len());
    while end > 0 && digits[end - 1] == '0' && slots[end - 1] != '0' {
        end -= 1;
    }

    let mut fraction: String = digits[..end].iter().collect();
    fraction.extend(slots[end..].iter().filter(|&&c| c == '?').map(|_| ' '));
    (slots.is_empty() || !fraction.is_empty()).then_some(fraction)
}

/// Round half away from zero at `decimals` places
pub(crate) fn round_to(value: f64, decimals: usize) -> f64 {
    if decimals == 0 {
        return value.round();
    }
    let factor = 10_f64.powi(decimals.min(308) as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}

pub(crate) fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        out.push(c);
        let from_end = len - i;
        if from_end > 1 && from_end % 3 == 1 {
            out.push(',');
        }
    }
    out
}

/// Render a plain numeric section
pub(crate) fn render_number(section: &FormatSection, value: f64) -> String {
    let layout = Layout::new(&section.tokens);
    let scaled = value * 100_f64.powi(layout.percent as i32)
        / 1000_f64.powi(layout.scale_commas as i32);
    let digits = Digits::new(&layout, scaled);
    walk(&section.tokens, &layout, &digits, value, None)
}

/// `value / 10^exponent` in two steps, so subnormal values do not divide by
/// an infinite power of ten
fn scale_down(value: f64, exponent: i32) -> f64 {
    let half = exponent / 2;
    value / 10_f64.powi(half) / 10_f64.powi(exponent - half)
}

/// Render a section with an `E+`/`E-` exponent.
///
/// One integer placeholder gives standard notation. With more, the exponent
/// is kept to a multiple of the integer placeholder count (engineering
/// notation for `##0.0E+0`).
pub(crate) fn render_scientific(section: &FormatSection, value: f64) -> String {
    let tokens = &section.tokens;
    let Some(exp_index) = tokens
        .iter()
        .position(|t| matches!(t, FormatToken::Exponential(_)))
    else {
        return render_number(section, value);
    };

    let layout = Layout::new(&tokens[..exp_index]);
    let group = layout.int_slots.len().max(1) as i32;
    let decimals = layout.frac_slots.len();

    let (mantissa, exponent) = if value == 0.0 {
        (0.0, 0)
    } else {
        let mut exponent = value.log10().floor() as i32;
        if group > 1 {
            exponent = exponent.div_euclid(group) * group;
        }
        let mut mantissa = round_to(scale_down(value, exponent), decimals);
        if mantissa >= 10_f64.powi(group) {
            exponent += group;
            mantissa = round_to(scale_down(value, exponent), decimals);
        }
        (mantissa, exponent)
    };
    if !mantissa.is_finite() {
        return format_general(value);
    }

    let width = tokens[exp_index + 1..]
        .iter()
        .filter_map(FormatToken::placeholder)
        .map(|(_, n)| n)
        .sum::<usize>()
        .max(1);
    let exponent_text = match &tokens[exp_index] {
        FormatToken::Exponential(mark) => {
            let e = mark.chars().next().unwrap_or('E');
            let sign = if exponent < 0 {
                "-"
            } else if mark.ends_with('+') {
                "+"
            } else {
                ""
            };
            format!("{e}{sign}{:0width$}", exponent.unsigned_abs())
        },
        _ => String::new(),
    };

    let digits = Digits::new(&layout, mantissa);
    walk(tokens, &layout, &digits, value, Some((exp_index, &exponent_text)))
}

fn walk(
    tokens: &[FormatToken],
    layout: &Layout,
    digits: &Digits,
    value: f64,
    exponent: Option<(usize, &str)>,
) -> String {
    let mut out = String::new();
    let mut slot = 0;

    for (i, token) in tokens.iter().enumerate() {
        let in_mantissa = exponent.is_none_or(|(e, _)| i < e);
        match token {
            FormatToken::DigitZero(n) | FormatToken::DigitHash(n) | FormatToken::DigitQuestion(n) => {
                if in_mantissa && !layout.is_fraction_index(i) {
                    let end = (slot + n).min(digits.integer.len());
                    for text in &digits.integer[slot.min(end)..end] {
                        out.push_str(text);
                    }
                    slot = end;
                }
            },
            FormatToken::DecimalPoint if Some(i) == layout.decimal && in_mantissa => {
                if layout.int_slots.is_empty()
                    && let Some(int_part) = digits.integer.first()
                {
                    out.push_str(int_part);
                }
                if let Some(fraction) = &digits.fraction {
                    out.push('.');
                    out.push_str(fraction);
                }
            },
            FormatToken::DecimalPoint => out.push('.'),
            FormatToken::Exponential(_) => {
                if let Some((_, text)) = exponent {
                    out.push_str(text);
                }
            },
            FormatToken::Percent => out.push('%'),
            FormatToken::Literal(s) | FormatToken::CurrencyLanguage(s) => out.push_str(s),
            FormatToken::Alignment(_) => out.push(' '),
            FormatToken::RepeatChar(c) => out.push(*c),
            FormatToken::General | FormatToken::TextPlaceholder => {
                out.push_str(&format_general(value))
            },
            _ => {},
        }
    }
    out
}
