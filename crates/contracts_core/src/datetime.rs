//! Datetime parsing and UTC normalization.
//!
//! Datetime fields carry a strftime-style `format`. Parsed values are always
//! normalized to UTC: naive values are assumed to be UTC already, offset-aware
//! values are converted.

use crate::{ContractError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Format used by datetime fields that do not declare one.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses `value` with `format` and normalizes the result to UTC.
///
/// Formats carrying an offset (`%z`, `%:z`) yield aware values which are
/// converted; formats without one are read as UTC wall time. Date-only formats
/// resolve to midnight.
pub fn parse_datetime(value: &str, format: &str) -> Result<DateTime<Utc>> {
    if let Ok(aware) = DateTime::<FixedOffset>::parse_from_str(value, format) {
        return Ok(aware.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, format) {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(ContractError::DateTimeParse {
        value: value.to_string(),
        format: format.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_default_format() {
        let dt = parse_datetime("2024-03-01 12:30", DEFAULT_DATETIME_FORMAT).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.timezone(), Utc);
    }

    #[test]
    fn test_aware_value_converted_to_utc() {
        let dt = parse_datetime("2024-03-01 12:30 +0200", "%Y-%m-%d %H:%M %z").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_date_only_format() {
        let dt = parse_datetime("2024-03-01", "%Y-%m-%d").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_mismatching_format() {
        let err = parse_datetime("01.03.2024", DEFAULT_DATETIME_FORMAT).unwrap_err();
        assert!(matches!(err, ContractError::DateTimeParse { .. }));
    }
}
