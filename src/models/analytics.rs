//! Dashboard and analytics shapes
//!
//! Summary counters and chart series derived from the record collection.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::vehicle::VehicleType;

/// KPI cards of the dashboard, computed over the unfiltered collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardKpis {
    pub total_inside: usize,
    pub entered_today: usize,
    pub avg_duration_minutes: i64,
    /// `None` for an empty collection
    pub most_common_type: Option<VehicleType>,
}

impl DashboardKpis {
    pub fn most_common_type_label(&self) -> &'static str {
        self.most_common_type.map(|t| t.as_str()).unwrap_or("N/A")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSplit {
    pub inside: usize,
    pub exited: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub label: String,
    pub count: usize,
}

/// Entries of one day split by vehicle type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTypeBreakdown {
    pub day: NaiveDate,
    pub counts: BTreeMap<String, usize>,
}

/// Traffic analytics over the full collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_records: usize,
    pub status_split: StatusSplit,
    pub type_counts: Vec<TypeCount>,
    pub entries_per_day: Vec<DayCount>,
    pub peak_hours: Vec<HourCount>,
    pub type_trend: Vec<DailyTypeBreakdown>,
}
