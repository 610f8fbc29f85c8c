//! Fraction rendering (`# ?/?`, `?/16`, `??/??`)

use super::general::format_general;
use super::number::pad_integer;
use super::parser::FormatSection;
use super::tokens::FormatToken;

/// Denominators wider than this are capped; the mediant search is linear in
/// the bound
const MAX_DENOMINATOR_DIGITS: usize = 5;

/// Best approximation `n/d` of `x` in `[0, 1]` with `d <= max_den`,
/// found by walking the Stern–Brocot tree
pub(crate) fn best_rational(x: f64, max_den: u64) -> (u64, u64) {
    if x <= 0.0 {
        return (0, 1);
    }
    let (mut a, mut b, mut c, mut d) = (0u64, 1u64, 1u64, 1u64);
    loop {
        let md = b + d;
        if md > max_den {
            break;
        }
        let mn = a + c;
        let mediant = mn as f64 / md as f64;
        if x == mediant {
            return (mn, md);
        }
        if x > mediant {
            (a, b) = (mn, md);
        } else {
            (c, d) = (mn, md);
        }
    }
    if x - a as f64 / b as f64 <= c as f64 / d as f64 - x {
        (a, b)
    } else {
        (c, d)
    }
}

fn expand(tokens: &[FormatToken]) -> Vec<char> {
    tokens
        .iter()
        .filter_map(FormatToken::placeholder)
        .flat_map(|(c, n)| std::iter::repeat_n(c, n))
        .collect()
}

/// Render a section containing a fraction bar.
///
/// Placeholders directly before the bar form the numerator and any earlier
/// ones the integer part. Without an integer part the whole value goes into
/// the numerator.
pub(crate) fn render_fraction(section: &FormatSection, value: f64) -> String {
    let tokens = &section.tokens;
    let Some(bar) = tokens.iter().position(|t| *t == FormatToken::Fraction) else {
        return format_general(value);
    };

    let num_start = tokens[..bar]
        .iter()
        .rposition(|t| !t.is_digit_placeholder())
        .map_or(0, |p| p + 1);
    let int_slots = expand(&tokens[..num_start]);
    let num_slots = expand(&tokens[num_start..bar]);

    let (fixed, den_end) = match tokens.get(bar + 1) {
        Some(FormatToken::Denominator(d)) => (Some(u64::from(*d)), bar + 2),
        _ => {
            let n = tokens[bar + 1..]
                .iter()
                .take_while(|t| t.is_digit_placeholder())
                .count();
            (None, bar + 1 + n)
        },
    };
    let den_slots = expand(&tokens[bar + 1..den_end]);

    let mixed = !int_slots.is_empty();
    let (mut whole, frac) = if mixed {
        (value.trunc(), value.fract())
    } else {
        (0.0, value)
    };

    let (mut num, den) = match fixed {
        Some(d) => ((frac * d as f64).round() as u64, d),
        None => {
            let digits = den_slots.len().clamp(1, MAX_DENOMINATOR_DIGITS);
            let max_den = 10u64.pow(digits as u32) - 1;
            let ip = frac.trunc();
            let (n, d) = best_rational(frac - ip, max_den);
            ((ip as u64).saturating_mul(d).saturating_add(n), d)
        },
    };
    if mixed && num >= den {
        whole += 1.0;
        num = 0;
    }

    let blank = mixed && num == 0;
    let int_text = if !mixed {
        String::new()
    } else if whole == 0.0 && value != 0.0 && int_slots.last() != Some(&'0') {
        pad_integer(&int_slots, "", false)
    } else {
        pad_integer(&int_slots, &format!("{whole:.0}"), false)
    };
    let num_text = if blank {
        " ".repeat(num_slots.len())
    } else {
        pad_integer(&num_slots, itoa::Buffer::new().format(num), false)
    };
    let bar_text = if blank && fixed.is_none() { ' ' } else { '/' };
    let den_text = if blank && fixed.is_none() {
        " ".repeat(den_slots.len())
    } else {
        let mut text = itoa::Buffer::new().format(den).to_string();
        let pad = den_slots
            .iter()
            .skip(text.len())
            .filter(|&&c| c != '#')
            .count();
        text.extend(std::iter::repeat_n(' ', pad));
        text
    };

    let mut out = String::new();
    let (mut int_done, mut num_done, mut den_done) = (false, false, false);
    for (i, token) in tokens.iter().enumerate() {
        match token {
            t if t.is_digit_placeholder() => {
                let (done, text) = if i < num_start {
                    (&mut int_done, &int_text)
                } else if i < bar {
                    (&mut num_done, &num_text)
                } else if i < den_end {
                    (&mut den_done, &den_text)
                } else {
                    continue;
                };
                if !*done {
                    out.push_str(text);
                    *done = true;
                }
            },
            FormatToken::Fraction => out.push(bar_text),
            FormatToken::Denominator(_) => out.push_str(&den_text),
            FormatToken::DecimalPoint => out.push('.'),
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
