//! Dwell-time calculation
//!
//! Elapsed time between entry and exit, or between entry and the reference
//! instant for vehicles still inside. All inputs are UTC instants.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::utils::validation::parse_utc_timestamp;

/// Shown when no entry time is available
pub const NOT_AVAILABLE: &str = "N/A";
/// Shown when a timestamp cannot be parsed
pub const INVALID: &str = "Invalid";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Whole minutes spent inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DwellDuration {
    total_minutes: i64,
}

impl DwellDuration {
    pub fn from_minutes(total_minutes: i64) -> Self {
        Self {
            total_minutes: total_minutes.max(0),
        }
    }

    pub fn total_minutes(&self) -> i64 {
        self.total_minutes
    }

    pub fn hours(&self) -> i64 {
        self.total_minutes / 60
    }

    pub fn minutes(&self) -> i64 {
        self.total_minutes % 60
    }
}

impl fmt::Display for DwellDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours(), self.minutes())
    }
}

/// Dwell time from `in_time` to `out_time`, or to `now` while still inside.
///
/// Partial minutes are floored. An end before the start (clock skew between
/// the gate and the store) counts as zero.
pub fn dwell_duration(
    in_time: DateTime<Utc>,
    out_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DwellDuration {
    let end = out_time.unwrap_or(now);
    let elapsed_secs = (end - in_time).num_seconds();
    DwellDuration::from_minutes(elapsed_secs.div_euclid(60))
}

/// Same as [`dwell_duration`] over raw wire timestamps.
pub fn dwell_duration_from_str(
    in_time: Option<&str>,
    out_time: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DwellDuration, DurationError> {
    let in_raw = in_time
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| DurationError::InvalidInput("missing entry time".to_string()))?;
    let start = parse_utc_timestamp(in_raw)
        .ok_or_else(|| DurationError::InvalidInput(format!("unparsable entry time '{}'", in_raw)))?;

    let end = match out_time.filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(
            parse_utc_timestamp(raw)
                .ok_or_else(|| DurationError::InvalidInput(format!("unparsable exit time '{}'", raw)))?,
        ),
        None => None,
    };

    Ok(dwell_duration(start, end, now))
}

/// Display string `"{h}h {m}m"`, or a sentinel when the input is unusable.
pub fn format_dwell(in_time: Option<&str>, out_time: Option<&str>, now: DateTime<Utc>) -> String {
    if in_time.map_or(true, |s| s.trim().is_empty()) {
        return NOT_AVAILABLE.to_string();
    }
    match dwell_duration_from_str(in_time, out_time, now) {
        Ok(duration) => duration.to_string(),
        Err(_) => INVALID.to_string(),
    }
}
