//! The `General` number format

/// Integers below this magnitude print in full; at or above it they switch to
/// scientific notation
const SCIENTIFIC_THRESHOLD: f64 = 1e11;

/// Non-integers below this magnitude also switch to scientific notation
const SMALL_THRESHOLD: f64 = 1e-9;

/// Significant digits kept for non-integers
const SIGNIFICANT_DIGITS: i32 = 10;

/// Render `value` the way the `General` format shows it.
///
/// # Examples
///
/// ```
/// use binsheet::sheet::numfmt::format_general;
///
/// assert_eq!(format_general(42.0), "42");
/// assert_eq!(format_general(1.0 / 3.0), "0.333333333");
/// assert_eq!(format_general(123456789012.0), "1.23457E+11");
/// ```
pub fn format_general(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let abs = value.abs();
    if abs == 0.0 {
        return "0".to_string();
    }
    if abs >= SCIENTIFIC_THRESHOLD || abs < SMALL_THRESHOLD {
        return scientific(value);
    }
    if value.fract() == 0.0 {
        return itoa::Buffer::new().format(value as i64).to_string();
    }

    let int_digits = if abs >= 1.0 {
        abs.log10().floor() as i32 + 1
    } else {
        1
    };
    let decimals = (SIGNIFICANT_DIGITS - int_digits).max(0) as usize;
    trim_fraction(format!("{value:.decimals$}"))
}

/// `1.23457E+11` style: five decimals, trailing zeros trimmed, two-digit
/// minimum exponent
fn scientific(value: f64) -> String {
    let formatted = format!("{value:.5E}");
    let Some((mantissa, exponent)) = formatted.split_once('E') else {
        return formatted;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!(
        "{}E{sign}{:02}",
        trim_fraction(mantissa.to_string()),
        exponent.unsigned_abs()
    )
}

/// Drop trailing zeros after a decimal point, and the point itself if bare
pub(crate) fn trim_fraction(mut s: String) -> String {
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}
