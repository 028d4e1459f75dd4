//! Traffic analytics
//!
//! Chart series for the analytics page: status split, type counts, entries
//! per day, peak hours and the per-day type trend. Days and hours are taken
//! in site-local time.

use chrono::{FixedOffset, NaiveDate, Timelike};
use std::collections::BTreeMap;

use crate::models::analytics::{
    AnalyticsReport, DailyTypeBreakdown, DayCount, HourCount, StatusSplit, TypeCount,
};
use crate::models::vehicle::VehicleRecord;

pub fn build_analytics(records: &[VehicleRecord], site: &FixedOffset) -> AnalyticsReport {
    AnalyticsReport {
        total_records: records.len(),
        status_split: status_split(records),
        type_counts: type_counts(records),
        entries_per_day: entries_per_day(records, site),
        peak_hours: peak_hours(records, site),
        type_trend: type_trend(records, site),
    }
}

pub fn status_split(records: &[VehicleRecord]) -> StatusSplit {
    let inside = records.iter().filter(|r| r.is_inside()).count();
    StatusSplit {
        inside,
        exited: records.len() - inside,
    }
}

/// Counts per type, in first-seen order
pub fn type_counts(records: &[VehicleRecord]) -> Vec<TypeCount> {
    let mut counts: Vec<TypeCount> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|c| c.vehicle_type == record.vehicle_type) {
            Some(entry) => entry.count += 1,
            None => counts.push(TypeCount {
                vehicle_type: record.vehicle_type,
                count: 1,
            }),
        }
    }
    counts
}

fn local_day(record: &VehicleRecord, site: &FixedOffset) -> NaiveDate {
    record.in_time.with_timezone(site).date_naive()
}

/// Entries grouped by local calendar day, oldest first
pub fn entries_per_day(records: &[VehicleRecord], site: &FixedOffset) -> Vec<DayCount> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *days.entry(local_day(record, site)).or_insert(0) += 1;
    }
    days.into_iter().map(|(day, count)| DayCount { day, count }).collect()
}

/// Always 24 buckets, hour 0 through 23
pub fn peak_hours(records: &[VehicleRecord], site: &FixedOffset) -> Vec<HourCount> {
    let mut buckets = [0usize; 24];
    for record in records {
        let hour = record.in_time.with_timezone(site).hour() as usize;
        buckets[hour] += 1;
    }
    buckets
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourCount {
            hour: hour as u32,
            label: format!("{}:00", hour),
            count,
        })
        .collect()
}

pub fn type_trend(records: &[VehicleRecord], site: &FixedOffset) -> Vec<DailyTypeBreakdown> {
    let mut days: BTreeMap<NaiveDate, BTreeMap<String, usize>> = BTreeMap::new();
    for record in records {
        *days
            .entry(local_day(record, site))
            .or_default()
            .entry(record.vehicle_type.as_str().to_string())
            .or_insert(0) += 1;
    }
    days.into_iter()
        .map(|(day, counts)| DailyTypeBreakdown { day, counts })
        .collect()
}
