//! Timestamp parsing for incoming samples.
//!
//! Producers send ISO 8601 strings (`2019-07-27T10:19:07.123456+00:00`).
//! Forms without an offset are read as UTC, and a bare date is midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Naive date-time layouts accepted when no offset is present.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("Unparseable timestamp: {0:?}")]
    Unparseable(String),
}

/// Parse a sample timestamp into an absolute instant.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    // RFC 3339 with a space separator is common from Python's str(datetime)
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(TimestampError::Unparseable(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_python_isoformat() {
        let ts = parse_timestamp("2019-07-27T10:19:07.123456+00:00").unwrap();
        assert_eq!(ts.timestamp(), 1_564_222_747);
        assert_eq!(ts.timestamp_subsec_micros(), 123_456);
    }

    #[test]
    fn test_converts_offsets_to_utc() {
        let ts = parse_timestamp("2019-07-27T12:19:07+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2019, 7, 27, 10, 19, 7).unwrap());
    }

    #[test]
    fn test_zulu_suffix() {
        let ts = parse_timestamp("2019-07-27T10:19:07Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2019, 7, 27, 10, 19, 7).unwrap());
    }

    #[test]
    fn test_space_separated_with_offset() {
        let ts = parse_timestamp("2019-07-27 10:19:07.5+00:00").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_naive_forms_are_utc() {
        let expected = Utc.with_ymd_and_hms(2019, 7, 27, 10, 19, 7).unwrap();
        assert_eq!(parse_timestamp("2019-07-27T10:19:07").unwrap(), expected);
        assert_eq!(parse_timestamp("2019-07-27 10:19:07").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2019-07-27T10:19").unwrap(),
            Utc.with_ymd_and_hms(2019, 7, 27, 10, 19, 0).unwrap()
        );
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        let ts = parse_timestamp("  2019-07-27 ").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2019, 7, 27, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = parse_timestamp("yesterday-ish").unwrap_err();
        assert_eq!(err, TimestampError::Unparseable("yesterday-ish".to_string()));
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("2019-13-40T10:19:07Z").is_err());
    }
}
