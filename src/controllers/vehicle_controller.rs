use validator::Validate;

use crate::dto::vehicle_dto::{
    CreateVehicleRequest, CreateVehicleResponse, DashboardQuery, DashboardResponse, DashboardRow, ExitResponse,
    HealthResponse, OverstayEntry, OverstayQuery, OverstayResponse,
};
use crate::metrics;
use crate::models::analytics::AnalyticsReport;
use crate::models::vehicle::{NewVehicleEntry, VehicleRecord};
use crate::repositories::{ExitOutcome, InsertOutcome};
use crate::services::analytics_service::build_analytics;
use crate::services::dashboard_view::DashboardView;
use crate::services::overstay::OverstayPolicy;
use crate::services::report_service::{export_csv, render_pdf_report, render_print_report};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};

pub struct VehicleController {
    state: AppState,
}

impl VehicleController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    async fn collection(&self) -> AppResult<Vec<VehicleRecord>> {
        self.state.store.list(self.state.config.vehicle_list_limit).await
    }

    pub async fn health(&self) -> HealthResponse {
        match self.state.store.ping().await {
            Ok(()) => HealthResponse {
                status: "ok".to_string(),
                message: "Gate entry API is running".to_string(),
            },
            Err(e) => {
                log::error!("❌ Health check failed: {}", e);
                HealthResponse {
                    status: "error".to_string(),
                    message: "Vehicle store is not reachable".to_string(),
                }
            }
        }
    }

    pub async fn list(&self) -> AppResult<Vec<VehicleRecord>> {
        self.collection().await
    }

    pub async fn register(&self, request: CreateVehicleRequest) -> AppResult<CreateVehicleResponse> {
        request.validate()?;

        let vehicle_no = request.vehicle_no.trim().to_string();
        let container_id = request.container_id();
        let vehicle_type = request
            .vehicle_type
            .unwrap_or_else(|| self.state.classifier.classify(&vehicle_no, container_id.as_deref()));

        let entry = NewVehicleEntry {
            vehicle_no,
            container_id,
            vehicle_type,
            plant: request.plant,
            in_time: self.state.clock.now(),
        };

        match self.state.store.insert(entry).await? {
            InsertOutcome::Created(vehicle) => {
                metrics::VEHICLES_REGISTERED.inc();
                log::info!("✅ {} entered ({}, {:?})", vehicle.vehicle_no, vehicle.vehicle_type, vehicle.plant);
                Ok(CreateVehicleResponse {
                    id: vehicle.id.clone(),
                    status: "ok".to_string(),
                    message: format!("✅ Vehicle {} registered.", vehicle.vehicle_no),
                    vehicle,
                })
            }
            InsertOutcome::Duplicate(existing) => {
                metrics::DUPLICATE_ENTRIES.inc();
                Err(AppError::Duplicate {
                    vehicle_no: existing.vehicle_no,
                })
            }
        }
    }

    pub async fn mark_exit(&self, id: &str) -> AppResult<ExitResponse> {
        let now = self.state.clock.now();
        match self.state.store.mark_exit(id, now).await? {
            ExitOutcome::Exited(vehicle) => {
                metrics::VEHICLE_EXITS.inc();
                log::info!("🚪 {} exited", vehicle.vehicle_no);
                Ok(ExitResponse {
                    message: format!("Vehicle {} marked as exited.", vehicle.vehicle_no),
                    vehicle,
                })
            }
            ExitOutcome::AlreadyExited(vehicle) => Err(AppError::Conflict(format!(
                "Vehicle {} has already exited",
                vehicle.vehicle_no
            ))),
            ExitOutcome::NotFound => Err(not_found_error("Vehicle", id)),
        }
    }

    pub async fn dashboard(&self, query: &DashboardQuery) -> AppResult<DashboardResponse> {
        let site = self.state.config.site_offset();
        let criteria = query.to_criteria(&site)?;
        let records = self.collection().await?;
        let now = self.state.clock.now();
        let policy = self.state.overstay_policy();

        let view = DashboardView::build(&records, &criteria, now, &site);
        let rows = |records: Vec<VehicleRecord>| -> Vec<DashboardRow> {
            records.into_iter().map(|r| DashboardRow::new(r, now, &policy)).collect()
        };

        Ok(DashboardResponse {
            most_common_type_label: view.kpis.most_common_type_label().to_string(),
            inside: rows(view.inside),
            exited: rows(view.exited),
            kpis: view.kpis,
            generated_at: now,
        })
    }

    pub async fn overstaying(&self, query: &OverstayQuery) -> AppResult<OverstayResponse> {
        let policy = match query.threshold_hours {
            Some(hours) if hours < 0 => return Err(bad_request_error("thresholdHours must not be negative")),
            Some(hours) => OverstayPolicy::new(hours),
            None => self.state.overstay_policy(),
        };

        let records = self.collection().await?;
        let now = self.state.clock.now();
        let vehicles: Vec<OverstayEntry> = policy
            .overstaying(&records, now)
            .into_iter()
            .map(|alert| OverstayEntry {
                message: alert.message(),
                duration: alert.duration.to_string(),
                vehicle: alert.record.clone(),
            })
            .collect();

        Ok(OverstayResponse {
            threshold_hours: policy.threshold_hours,
            count: vehicles.len(),
            vehicles,
        })
    }

    pub async fn analytics(&self) -> AppResult<AnalyticsReport> {
        let records = self.collection().await?;
        Ok(build_analytics(&records, &self.state.config.site_offset()))
    }

    async fn find_existing(&self, id: &str) -> AppResult<VehicleRecord> {
        self.state
            .store
            .find(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    pub async fn report_html(&self, id: &str) -> AppResult<String> {
        let record = self.find_existing(id).await?;
        Ok(render_print_report(&record, self.state.clock.now(), &self.state.config.site_offset()))
    }

    /// PDF bytes and the vehicle number for the download name
    pub async fn report_pdf(&self, id: &str) -> AppResult<(Vec<u8>, String)> {
        let record = self.find_existing(id).await?;
        let bytes = render_pdf_report(&record, self.state.clock.now(), &self.state.config.site_offset())
            .map_err(|e| AppError::Internal(format!("PDF rendering failed: {}", e)))?;
        Ok((bytes, record.vehicle_no))
    }

    pub async fn export_csv(&self, query: &DashboardQuery) -> AppResult<String> {
        let site = self.state.config.site_offset();
        let criteria = query.to_criteria(&site)?;
        let records: Vec<VehicleRecord> = self
            .collection()
            .await?
            .into_iter()
            .filter(|r| criteria.matches(r))
            .collect();

        export_csv(&records, self.state.clock.now(), &site)
            .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
    }
}
