//! Show date parsing.
//!
//! Clients send show dates in one of three conventions without a
//! discriminator field. Formats are tried in a fixed order and the first one
//! that parses wins:
//!
//! 1. RFC 3339 timestamp with offset (`2024-12-25T20:00:00Z`)
//! 2. Calendar date (`2024-12-25`), interpreted as midnight UTC
//! 3. Calendar date with minute precision time (`2024-12-25 20:00`), UTC
//!
//! No input satisfies two of these formats, so detection is total and
//! deterministic.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

/// Calendar date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar date with minute precision time.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Stored timestamps need a four-digit year, in UTC.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Error returned when a show date matches none of the accepted formats.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Invalid date '{input}': expected RFC 3339 (2024-12-25T20:00:00Z), YYYY-MM-DD or YYYY-MM-DD HH:MM"
)]
pub struct ShowDateError {
    /// The rejected input.
    pub input: String,
}

/// Parses a show date into a UTC instant.
///
/// Instants whose UTC year falls outside `0..=9999` are rejected, including
/// signed years such as `+12345-01-01`.
pub fn parse_show_date(input: &str) -> Result<DateTime<Utc>, ShowDateError> {
    detect_format(input.trim())
        .filter(|instant| YEAR_RANGE.contains(&instant.year()))
        .ok_or_else(|| ShowDateError {
            input: input.to_string(),
        })
}

fn detect_format(trimmed: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }

    NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT)
        .ok()
        .map(|date_time| date_time.and_utc())
}

/// Returns the calendar date of an instant, in UTC.
///
/// Show uniqueness and date range filters compare calendar dates only.
pub fn calendar_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Parses a date range filter bound. Malformed input yields `None` so that
/// list endpoints can ignore it.
pub fn parse_date_filter(input: &str) -> Option<NaiveDate> {
    if input.trim().is_empty() {
        return None;
    }
    parse_show_date(input).ok().map(calendar_date)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike};

    use super::*;

    #[test]
    fn test_parse_date_only() {
        let parsed = parse_show_date("2024-12-25").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_with_minutes() {
        let parsed = parse_show_date("2024-12-25 20:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 12, 25, 20, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_show_date("2024-12-25T20:00:00Z").unwrap();
        assert_eq!(parsed.hour(), 20);
        assert_eq!(parsed.day(), 25);
    }

    #[test]
    fn test_parse_rfc3339_with_offset_converts_to_utc() {
        let parsed = parse_show_date("2024-12-25T22:30:00-05:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 12, 26, 3, 30, 0).unwrap());
        assert_eq!(
            calendar_date(parsed),
            NaiveDate::from_ymd_opt(2024, 12, 26).unwrap()
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_show_date("  2024-12-25 ").is_ok());
    }

    #[test]
    fn test_reject_us_style_date() {
        let err = parse_show_date("12/25/2024").unwrap_err();
        assert_eq!(err.input, "12/25/2024");
    }

    #[test]
    fn test_reject_garbage() {
        assert!(parse_show_date("").is_err());
        assert!(parse_show_date("tomorrow").is_err());
        assert!(parse_show_date("2024-13-01").is_err());
        assert!(parse_show_date("2024-12-25 20:00:00").is_err());
    }

    #[test]
    fn test_reject_years_without_four_digit_form() {
        for input in ["+12345-01-01", "+12345-01-01 20:00", "-0001-06-01", "9999-12-31T23:00:00-05:00"] {
            let err = parse_show_date(input).unwrap_err();
            assert_eq!(err.input, input);
        }
        assert_eq!(parse_date_filter("+12345-01-01"), None);

        let latest = parse_show_date("9999-12-31 23:59").unwrap();
        assert_eq!(latest.year(), 9999);
    }

    #[test]
    fn test_same_calendar_date_regardless_of_time() {
        let morning = parse_show_date("2024-12-25").unwrap();
        let evening = parse_show_date("2024-12-25 20:00").unwrap();
        assert_eq!(calendar_date(morning), calendar_date(evening));
    }

    #[test]
    fn test_parse_date_filter() {
        assert_eq!(
            parse_date_filter("2024-01-31"),
            NaiveDate::from_ymd_opt(2024, 1, 31)
        );
        assert_eq!(parse_date_filter("01/31/2024"), None);
        assert_eq!(parse_date_filter(""), None);
    }
}
