//! Date, time and elapsed-time rendering

use super::general::format_general;
use super::parser::FormatSection;
use super::tokens::FormatToken;
use crate::ooxml::xlsb::date_utils::{SecondPrecision, serial_to_datetime_with, sub_second_millis};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fmt::Write;

/// Added before rounding elapsed totals so exact boundaries survive
const ELAPSED_EPSILON: f64 = 1e-9;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Sub-second digits beyond this are always zero
const MAX_SUBSECOND_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Hour,
    Minute,
    Second,
    Other,
}

fn unit_of(token: &FormatToken) -> Unit {
    let text = match token {
        FormatToken::DateTime(s) | FormatToken::ElapsedDateTime(s) => s,
        _ => return Unit::Other,
    };
    match text.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('h') => Unit::Hour,
        Some('m') if text.len() <= 2 => Unit::Minute,
        Some('s') => Unit::Second,
        _ => Unit::Other,
    }
}

/// Whether the `m`/`mm` token at `index` means minutes: the previous date
/// token is an hour or the next one is a second
fn is_minute(tokens: &[FormatToken], index: usize) -> bool {
    let previous = tokens[..index].iter().rev().find(|t| t.is_datetime());
    let next = tokens[index + 1..].iter().find(|t| t.is_datetime());
    previous.is_some_and(|t| unit_of(t) == Unit::Hour)
        || next.is_some_and(|t| unit_of(t) == Unit::Second)
}

fn is_meridiem(text: &str) -> bool {
    text.eq_ignore_ascii_case("am/pm") || text.eq_ignore_ascii_case("a/p") || text == "上午/下午"
}

/// Index of the decimal point that starts sub-second digits, with the digit
/// count, e.g. the `.00` in `ss.00`
fn subsecond_field(tokens: &[FormatToken]) -> Option<(usize, usize)> {
    tokens.windows(2).enumerate().find_map(|(i, pair)| match pair {
        [FormatToken::DecimalPoint, FormatToken::DigitZero(n)]
            if tokens[..i].iter().any(FormatToken::is_datetime) =>
        {
            Some((i, *n))
        },
        _ => None,
    })
}

fn push_padded(out: &mut String, value: i64, width: usize) {
    let _ = write!(out, "{value:0width$}");
}

/// Whole seconds in `serial`, rounded half up, or truncated when the
/// sub-second part is shown separately. `None` for negative durations.
fn total_seconds(serial: f64, truncate: bool) -> Option<i64> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let seconds = if truncate {
        (serial * SECONDS_PER_DAY * 1000.0).round() as i64 / 1000
    } else {
        (serial * SECONDS_PER_DAY + 0.5 + ELAPSED_EPSILON).floor() as i64
    };
    Some(seconds)
}

/// Value of `[h]`, `[mm]` or `[ss]` for a total in seconds
fn elapsed(text: &str, total: i64) -> i64 {
    match text.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('h') => total / 3600,
        Some('m') => total / 60,
        _ => total,
    }
}

/// Whether the clock token at `index` is read from the elapsed total rather
/// than the calendar value, e.g. the `mm` and `ss` in `[h]:mm:ss`
fn reads_total(tokens: &[FormatToken], index: usize) -> bool {
    match unit_of(&tokens[index]) {
        Unit::Second => true,
        Unit::Minute => is_minute(tokens, index),
        _ => false,
    }
}

fn push_subsecond(out: &mut String, millis: u32, digits: usize) {
    let shown = digits.min(MAX_SUBSECOND_DIGITS);
    let value = match shown {
        1 => ((millis + 50) / 100).min(9),
        2 => ((millis + 5) / 10).min(99),
        _ => millis,
    };
    push_padded(out, i64::from(value), shown);
    out.extend(std::iter::repeat_n('0', digits - shown));
}

/// Render a date or time section, or `None` when the serial is not a valid
/// date in the selected system (or is negative, for elapsed tokens).
///
/// A section with elapsed tokens takes every hour, minute and second field
/// from one rounded total, so a carry reaches `[h]` as well. The calendar
/// conversion is only needed when some other date token remains.
pub(crate) fn render_datetime(section: &FormatSection, serial: f64, date1904: bool) -> Option<String> {
    let tokens = &section.tokens;
    let subsecond = subsecond_field(tokens);
    let total = if tokens
        .iter()
        .any(|t| matches!(t, FormatToken::ElapsedDateTime(_)))
    {
        Some(total_seconds(serial, subsecond.is_some())?)
    } else {
        None
    };

    let needs_calendar = tokens.iter().enumerate().any(|(i, t)| {
        matches!(t, FormatToken::DateTime(_)) && (total.is_none() || !reads_total(tokens, i))
    });
    let dt = if needs_calendar {
        let precision = if subsecond.is_some() {
            SecondPrecision::Truncate
        } else {
            SecondPrecision::Round
        };
        Some(serial_to_datetime_with(serial, date1904, precision)?)
    } else {
        None
    };
    let twelve_hour = tokens
        .iter()
        .any(|t| matches!(t, FormatToken::DateTime(s) if is_meridiem(s)));

    let mut out = String::new();
    let mut skip_next = false;
    for (i, token) in tokens.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        match token {
            FormatToken::DateTime(text) => match (total, &dt) {
                (Some(total), _) if reads_total(tokens, i) => {
                    let value = match unit_of(token) {
                        Unit::Second => total % 60,
                        _ => total / 60 % 60,
                    };
                    push_padded(&mut out, value, text.chars().count().min(2));
                },
                (_, Some(dt)) => push_date_part(&mut out, text, dt, twelve_hour, is_minute(tokens, i)),
                _ => {},
            },
            FormatToken::ElapsedDateTime(text) => {
                if let Some(total) = total {
                    push_padded(&mut out, elapsed(text, total), text.chars().count());
                }
            },
            FormatToken::DecimalPoint => {
                out.push('.');
                if let Some((at, digits)) = subsecond
                    && at == i
                {
                    push_subsecond(&mut out, sub_second_millis(serial), digits);
                    skip_next = true;
                }
            },
            FormatToken::ThousandsSep => out.push(','),
            FormatToken::Percent => out.push('%'),
            FormatToken::Literal(s) | FormatToken::CurrencyLanguage(s) => out.push_str(s),
            FormatToken::Alignment(_) => out.push(' '),
            FormatToken::RepeatChar(c) => out.push(*c),
            FormatToken::General => out.push_str(&format_general(serial)),
            _ => {},
        }
    }
    Some(out)
}

fn push_date_part(out: &mut String, text: &str, dt: &NaiveDateTime, twelve_hour: bool, minute: bool) {
    if is_meridiem(text) {
        let pm = dt.hour() >= 12;
        match text {
            "上午/下午" => out.push_str(if pm { "下午" } else { "上午" }),
            _ if text.len() == 3 => {
                let marker = if pm { 'P' } else { 'A' };
                let lower = text.starts_with('a');
                out.push(if lower { marker.to_ascii_lowercase() } else { marker });
            },
            _ => out.push_str(if pm { "PM" } else { "AM" }),
        }
        return;
    }

    let len = text.chars().count();
    let Some(kind) = text.chars().next().map(|c| c.to_ascii_lowercase()) else {
        return;
    };
    let _ = match kind {
        'y' if len <= 2 => write!(out, "{:02}", dt.year().rem_euclid(100)),
        'y' | 'e' => write!(out, "{:04}", dt.year()),
        'm' if len <= 2 && minute => write!(out, "{:0len$}", dt.minute()),
        'm' => match len {
            1 | 2 => write!(out, "{:0len$}", dt.month()),
            3 => write!(out, "{}", dt.format("%b")),
            5 => write!(out, "{}", dt.format("%B").to_string().chars().take(1).collect::<String>()),
            _ => write!(out, "{}", dt.format("%B")),
        },
        'd' => match len {
            1 | 2 => write!(out, "{:0len$}", dt.day()),
            3 => write!(out, "{}", dt.format("%a")),
            _ => write!(out, "{}", dt.format("%A")),
        },
        'h' => {
            let hour = if twelve_hour {
                match dt.hour() % 12 {
                    0 => 12,
                    h => h,
                }
            } else {
                dt.hour()
            };
            write!(out, "{:0width$}", hour, width = len.min(2))
        },
        's' => write!(out, "{:0width$}", dt.second(), width = len.min(2)),
        // Calendar and era tokens of other locales
        _ => Ok(()),
    };
}
