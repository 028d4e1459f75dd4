//! Validation helpers
//!
//! Timestamp parsing shared by the wire model, query parameters and the
//! duration calculator, plus custom validators for request DTOs.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use validator::ValidationError;

/// Parse an ISO-8601 timestamp as a UTC instant.
///
/// Accepts RFC 3339 with an offset, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// (also with a space separator), which is read as UTC.
pub fn parse_utc_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a query bound: either a full timestamp or a `YYYY-MM-DD` calendar
/// date, which resolves to local midnight at the site.
pub fn parse_range_bound(value: &str, site: &FixedOffset) -> Option<DateTime<Utc>> {
    if let Some(ts) = parse_utc_timestamp(value) {
        return Some(ts);
    }
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    site.from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Reject blank strings
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_utc_timestamp("2024-01-15T13:30:00+05:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let ts = parse_utc_timestamp("2024-01-15T08:00:00.654321").unwrap();
        assert_eq!(ts.timestamp(), Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap().timestamp());
        assert!(parse_utc_timestamp("2024-01-15 08:00").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_utc_timestamp("").is_none());
        assert!(parse_utc_timestamp("not a date").is_none());
        assert!(parse_utc_timestamp("2024-13-40T00:00:00Z").is_none());
    }

    #[test]
    fn date_bound_is_site_midnight() {
        let colombo = FixedOffset::east_opt(330 * 60).unwrap();
        let bound = parse_range_bound("2024-01-15", &colombo).unwrap();
        assert_eq!(bound, Utc.with_ymd_and_hms(2024, 1, 14, 18, 30, 0).unwrap());
    }

    #[test]
    fn blank_values_fail_validation() {
        assert!(validate_not_empty("  ").is_err());
        assert!(validate_not_empty("WP-1234").is_ok());
    }
}
