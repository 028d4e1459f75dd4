use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::analytics::DashboardKpis;
use crate::models::vehicle::{Plant, VehicleRecord, VehicleType};
use crate::services::dashboard_view::{DateRange, FilterCriteria};
use crate::services::duration::dwell_duration;
use crate::services::overstay::OverstayPolicy;
use crate::utils::errors::{bad_request_error, AppError};
use crate::utils::validation::{parse_range_bound, parse_utc_timestamp, validate_not_empty};

// Request to open a record at the gate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    #[validate(custom = "validate_not_empty")]
    pub vehicle_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    pub plant: Plant,
    /// Classified from the plate when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<VehicleType>,
}

impl CreateVehicleRequest {
    /// Trimmed container id, `None` when blank
    pub fn container_id(&self) -> Option<String> {
        self.container_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVehicleResponse {
    pub id: String,
    pub status: String,
    pub message: String,
    pub vehicle: VehicleRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitResponse {
    pub message: String,
    pub vehicle: VehicleRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

// Dashboard filters as query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub plant: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl DashboardQuery {
    /// Resolve the query into filter criteria. A date-only `to` includes
    /// that whole site-local day.
    pub fn to_criteria(&self, site: &FixedOffset) -> Result<FilterCriteria, AppError> {
        let vehicle_type = non_blank(&self.vehicle_type)
            .map(|t| t.parse::<VehicleType>().map_err(bad_request_error))
            .transpose()?;
        let plant = non_blank(&self.plant)
            .map(|p| p.parse::<Plant>().map_err(bad_request_error))
            .transpose()?;

        let start = non_blank(&self.from)
            .map(|v| {
                parse_range_bound(v, site).ok_or_else(|| bad_request_error(format!("invalid 'from' bound '{}'", v)))
            })
            .transpose()?;
        let end = non_blank(&self.to)
            .map(|v| {
                let bound = parse_range_bound(v, site)
                    .ok_or_else(|| bad_request_error(format!("invalid 'to' bound '{}'", v)))?;
                let date_only = parse_utc_timestamp(v).is_none();
                Ok::<_, AppError>(if date_only { bound + Duration::days(1) } else { bound })
            })
            .transpose()?;

        let date_range = match (start, end) {
            (None, None) => None,
            (start, end) => Some(DateRange {
                start: start.unwrap_or(DateTime::<Utc>::MIN_UTC),
                end: end.unwrap_or(DateTime::<Utc>::MAX_UTC),
            }),
        };

        Ok(FilterCriteria {
            search_text: non_blank(&self.search).map(str::to_string),
            vehicle_type,
            plant,
            date_range,
        })
    }
}

/// Table row: the record plus what the dashboard derives for it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    #[serde(flatten)]
    pub record: VehicleRecord,
    pub duration: String,
    pub duration_minutes: i64,
    pub overstaying: bool,
}

impl DashboardRow {
    pub fn new(record: VehicleRecord, now: DateTime<Utc>, policy: &OverstayPolicy) -> Self {
        let duration = dwell_duration(record.in_time, record.out_time, now);
        let overstaying = policy.is_overstaying(&record, now);
        Self {
            duration: duration.to_string(),
            duration_minutes: duration.total_minutes(),
            overstaying,
            record,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub inside: Vec<DashboardRow>,
    pub exited: Vec<DashboardRow>,
    pub kpis: DashboardKpis,
    pub most_common_type_label: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverstayQuery {
    pub threshold_hours: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverstayEntry {
    pub vehicle: VehicleRecord,
    pub duration: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverstayResponse {
    pub threshold_hours: i64,
    pub count: usize,
    pub vehicles: Vec<OverstayEntry>,
}
