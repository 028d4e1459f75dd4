//! Overstay monitoring
//!
//! [`OverstayPolicy::is_overstaying`] is a pure predicate evaluated on every
//! reload of the record collection. [`OverstayTracker`] remembers which
//! records have already been reported so a caller can alert once per stay
//! instead of on every refresh.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::models::vehicle::VehicleRecord;
use crate::services::duration::{dwell_duration, DwellDuration};

pub const DEFAULT_THRESHOLD_HOURS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverstayPolicy {
    pub threshold_hours: i64,
}

impl Default for OverstayPolicy {
    fn default() -> Self {
        Self {
            threshold_hours: DEFAULT_THRESHOLD_HOURS,
        }
    }
}

impl OverstayPolicy {
    pub fn new(threshold_hours: i64) -> Self {
        Self { threshold_hours }
    }

    /// True iff the vehicle is still inside and has been for at least the
    /// threshold, in whole hours.
    pub fn is_overstaying(&self, record: &VehicleRecord, now: DateTime<Utc>) -> bool {
        record.is_inside() && dwell_duration(record.in_time, None, now).hours() >= self.threshold_hours
    }

    /// Every record currently over the threshold, in input order
    pub fn overstaying<'a>(
        &self,
        records: &'a [VehicleRecord],
        now: DateTime<Utc>,
    ) -> Vec<OverstayAlert<'a>> {
        records
            .iter()
            .filter(|r| self.is_overstaying(r, now))
            .map(|r| OverstayAlert {
                record: r,
                duration: dwell_duration(r.in_time, None, now),
            })
            .collect()
    }
}

/// One overstaying vehicle
#[derive(Debug, Clone, Serialize)]
pub struct OverstayAlert<'a> {
    pub record: &'a VehicleRecord,
    pub duration: DwellDuration,
}

impl OverstayAlert<'_> {
    pub fn message(&self) -> String {
        format!(
            "⚠️ Vehicle {} has been inside for {} (over the limit)",
            self.record.vehicle_no, self.duration
        )
    }
}

/// Alert de-duplication across refreshes
///
/// A record is reported the first time it is seen overstaying. It is
/// forgotten once it exits or drops out of the collection, so an id can only
/// alert again after a new stay.
#[derive(Debug, Default)]
pub struct OverstayTracker {
    policy: OverstayPolicy,
    alerted: HashSet<String>,
}

impl OverstayTracker {
    pub fn new(policy: OverstayPolicy) -> Self {
        Self {
            policy,
            alerted: HashSet::new(),
        }
    }

    /// Evaluate a freshly loaded collection and return only new alerts
    pub fn refresh<'a>(
        &mut self,
        records: &'a [VehicleRecord],
        now: DateTime<Utc>,
    ) -> Vec<OverstayAlert<'a>> {
        let current = self.policy.overstaying(records, now);
        let current_ids: HashSet<&str> = current.iter().map(|a| a.record.id.as_str()).collect();
        self.alerted.retain(|id| current_ids.contains(id.as_str()));

        current
            .into_iter()
            .filter(|alert| self.alerted.insert(alert.record.id.clone()))
            .collect()
    }

    pub fn alerted_count(&self) -> usize {
        self.alerted.len()
    }
}
