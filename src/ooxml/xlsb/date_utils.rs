//! Date and time utilities for XLSB serial numbers
//!
//! Excel stores dates as floating-point day counts from a base date:
//! - **1900 system**: serial 1 is January 1, 1900 (default). Lotus 1-2-3
//!   treated 1900 as a leap year, so serial 60 is the phantom February 29 and
//!   every serial from 61 on is one day ahead of the real calendar. Serial 0
//!   is shown as January 1, 1900.
//! - **1904 system**: serial 0 is January 1, 1904, with no leap-day artifact.
//!
//! The fractional part is the time of day (0.5 = noon).

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// Added to the fractional day before splitting it into seconds
const ROUND_EPSILON: f64 = 1e-9;

const SECONDS_PER_DAY: i64 = 86_400;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// First 1900-system serial past December 31, 9999
const SERIAL_LIMIT_1900: f64 = 2_958_466.0;

/// Days between the two epochs
const EPOCH_OFFSET_1904: f64 = 1_462.0;

/// How the time of day is reduced to whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondPrecision {
    /// Round half up; 23:59:59.5 rolls over to the next day
    Round,
    /// Drop the sub-second part so it can be rendered separately
    Truncate,
}

/// Convert a serial number to a calendar date and time.
///
/// Returns `None` for negative, non-finite and out-of-range serials.
///
/// # Examples
///
/// ```
/// use binsheet::ooxml::xlsb::date_utils::serial_to_datetime;
/// use chrono::{Datelike, Timelike};
///
/// let dt = serial_to_datetime(45285.5, false).unwrap();
/// assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2023, 12, 25, 12));
/// ```
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    serial_to_datetime_with(serial, date1904, SecondPrecision::Round)
}

/// [`serial_to_datetime`] with an explicit seconds policy
pub fn serial_to_datetime_with(
    serial: f64,
    date1904: bool,
    precision: SecondPrecision,
) -> Option<NaiveDateTime> {
    if !is_valid_serial(serial, date1904) {
        return None;
    }

    let (seconds, rollover) = match precision {
        SecondPrecision::Round => rounded_seconds(serial),
        SecondPrecision::Truncate => truncated_seconds(serial),
    };
    let days = serial.trunc() as i64 + rollover;

    let date = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?.checked_add_signed(TimeDelta::try_days(days)?)?
    } else {
        let base = NaiveDate::from_ymd_opt(1899, 12, 31)?;
        match days {
            0 => NaiveDate::from_ymd_opt(1900, 1, 1)?,
            d if d >= 61 => base.checked_add_signed(TimeDelta::try_days(d - 1)?)?,
            d => base.checked_add_signed(TimeDelta::try_days(d)?)?,
        }
    };

    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Whether `serial` can be converted in the given date system
#[inline]
pub fn is_valid_serial(serial: f64, date1904: bool) -> bool {
    let limit = if date1904 {
        SERIAL_LIMIT_1900 - EPOCH_OFFSET_1904
    } else {
        SERIAL_LIMIT_1900
    };
    serial.is_finite() && (0.0..limit).contains(&serial)
}

/// Milliseconds past the last whole second, from the serial itself.
///
/// Computed independently of the calendar conversion so sub-second digits
/// never pick up a carry from seconds rounding.
#[inline]
pub fn sub_second_millis(serial: f64) -> u32 {
    let total = (serial.fract().abs() * MILLIS_PER_DAY).round() as i64;
    (total % 1000) as u32
}

/// Whole seconds into the day, rounded half up, plus a day carry
fn rounded_seconds(serial: f64) -> (i64, i64) {
    let nanos = ((serial.fract() + ROUND_EPSILON) * SECONDS_PER_DAY as f64 * 1e9) as i64;
    let mut seconds = nanos / 1_000_000_000;
    if nanos % 1_000_000_000 >= 500_000_000 {
        seconds += 1;
    }
    (seconds % SECONDS_PER_DAY, seconds / SECONDS_PER_DAY)
}

/// Whole seconds into the day with the sub-second part dropped
fn truncated_seconds(serial: f64) -> (i64, i64) {
    let millis = (serial.fract() * MILLIS_PER_DAY).round() as i64;
    let seconds = millis / 1000;
    (seconds % SECONDS_PER_DAY, seconds / SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd_hms(dt: NaiveDateTime) -> (i32, u32, u32, u32, u32, u32) {
        (
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
        )
    }

    #[test]
    fn test_1900_leap_year_artifact() {
        let date = |s: f64| ymd_hms(serial_to_datetime(s, false).unwrap());
        assert_eq!(date(0.0), (1900, 1, 1, 0, 0, 0));
        assert_eq!(date(1.0), (1900, 1, 1, 0, 0, 0));
        assert_eq!(date(59.0), (1900, 2, 28, 0, 0, 0));
        // Phantom February 29 and the real March 1 both land on March 1
        assert_eq!(date(60.0), (1900, 3, 1, 0, 0, 0));
        assert_eq!(date(61.0), (1900, 3, 1, 0, 0, 0));
        assert_eq!(date(45285.0), (2023, 12, 25, 0, 0, 0));
    }

    #[test]
    fn test_1904_system() {
        let dt = serial_to_datetime(0.0, true).unwrap();
        assert_eq!(ymd_hms(dt), (1904, 1, 1, 0, 0, 0));
        // Same calendar day as 1900-system serial 45285
        let dt = serial_to_datetime(45285.0 - 1462.0, true).unwrap();
        assert_eq!(ymd_hms(dt), (2023, 12, 25, 0, 0, 0));
    }

    #[test]
    fn test_time_of_day() {
        let dt = serial_to_datetime(32703.0 / 86400.0, false).unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (9, 5, 3));

        let dt = serial_to_datetime(45285.75, false).unwrap();
        assert_eq!((dt.hour(), dt.minute()), (18, 0));
    }

    #[test]
    fn test_rounding_rolls_into_next_day() {
        let serial = 45285.0 + 86399.6 / 86400.0;
        let dt = serial_to_datetime(serial, false).unwrap();
        assert_eq!(ymd_hms(dt), (2023, 12, 26, 0, 0, 0));

        let dt = serial_to_datetime_with(serial, false, SecondPrecision::Truncate).unwrap();
        assert_eq!(ymd_hms(dt), (2023, 12, 25, 23, 59, 59));
    }

    #[test]
    fn test_sub_second_millis() {
        assert_eq!(sub_second_millis(62.75 / 86400.0), 750);
        assert_eq!(sub_second_millis(5.123 / 86400.0), 123);
        assert_eq!(sub_second_millis(62.0 / 86400.0), 0);
    }

    #[test]
    fn test_invalid_serials() {
        assert!(serial_to_datetime(-1.0, false).is_none());
        assert!(serial_to_datetime(f64::NAN, false).is_none());
        assert!(serial_to_datetime(f64::INFINITY, false).is_none());
        assert!(serial_to_datetime(2_958_466.0, false).is_none());
        assert!(serial_to_datetime(2_958_465.0, false).is_some());
        assert!(serial_to_datetime(2_958_466.0 - 1462.0, true).is_none());
    }

    #[test]
    fn test_last_valid_day() {
        let dt = serial_to_datetime(2_958_465.0, false).unwrap();
        assert_eq!(ymd_hms(dt), (9999, 12, 31, 0, 0, 0));
    }
}
