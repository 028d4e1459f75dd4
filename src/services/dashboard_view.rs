//! Dashboard projection
//!
//! Splits a record collection into the inside and exited tables, applying the
//! operator's filters, and computes the KPI cards over the whole collection.
//! Pure: nothing here mutates the input.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::models::analytics::DashboardKpis;
use crate::models::vehicle::{Plant, VehicleRecord, VehicleStatus, VehicleType};
use crate::services::duration::dwell_duration;

/// Half-open interval `[start, end)` on `in_time`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// Table filters; an unset field lets every record through on that dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search_text: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub plant: Option<Plant>,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &VehicleRecord) -> bool {
        let matches_search = match self.search_text.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => record
                .vehicle_no
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        };
        let matches_type = self.vehicle_type.map_or(true, |t| record.vehicle_type == t);
        let matches_plant = self.plant.map_or(true, |p| record.plant == Some(p));
        let matches_date = self.date_range.map_or(true, |range| range.contains(record.in_time));

        matches_search && matches_type && matches_plant && matches_date
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub inside: Vec<VehicleRecord>,
    pub exited: Vec<VehicleRecord>,
    pub kpis: DashboardKpis,
}

impl DashboardView {
    /// Build both tables and the KPIs. `site` is the gate's UTC offset, used
    /// to decide what "today" means.
    pub fn build(
        records: &[VehicleRecord],
        criteria: &FilterCriteria,
        now: DateTime<Utc>,
        site: &FixedOffset,
    ) -> Self {
        let filtered = |status: VehicleStatus| -> Vec<VehicleRecord> {
            records
                .iter()
                .filter(|r| r.status() == status && criteria.matches(r))
                .cloned()
                .collect()
        };

        Self {
            inside: filtered(VehicleStatus::Inside),
            exited: filtered(VehicleStatus::Exited),
            kpis: compute_kpis(records, now, site),
        }
    }
}

/// KPIs over the unfiltered collection
pub fn compute_kpis(records: &[VehicleRecord], now: DateTime<Utc>, site: &FixedOffset) -> DashboardKpis {
    let total_inside = records.iter().filter(|r| r.is_inside()).count();

    let today = now.with_timezone(site).date_naive();
    let entered_today = records
        .iter()
        .filter(|r| r.in_time.with_timezone(site).date_naive() == today)
        .count();

    let avg_duration_minutes = if records.is_empty() {
        0
    } else {
        let total: i64 = records
            .iter()
            .map(|r| dwell_duration(r.in_time, r.out_time, now).total_minutes())
            .sum();
        (total as f64 / records.len() as f64).round() as i64
    };

    DashboardKpis {
        total_inside,
        entered_today,
        avg_duration_minutes,
        most_common_type: most_common_type(records),
    }
}

/// Mode of `vehicle_type`; ties go to the type encountered first
pub fn most_common_type(records: &[VehicleRecord]) -> Option<VehicleType> {
    let mut counts: Vec<(VehicleType, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(t, _)| *t == record.vehicle_type) {
            Some((_, n)) => *n += 1,
            None => counts.push((record.vehicle_type, 1)),
        }
    }

    let mut best: Option<(VehicleType, usize)> = None;
    for (vehicle_type, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((vehicle_type, count));
        }
    }
    best.map(|(t, _)| t)
}
