use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{DashboardQuery, DashboardResponse, OverstayQuery, OverstayResponse};
use crate::models::analytics::AnalyticsReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/alerts/overstay", get(overstay_alerts))
        .route("/analytics", get(analytics))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let controller = VehicleController::new(state);
    let response = controller.dashboard(&query).await?;
    Ok(Json(response))
}

async fn overstay_alerts(
    State(state): State<AppState>,
    Query(query): Query<OverstayQuery>,
) -> Result<Json<OverstayResponse>, AppError> {
    let controller = VehicleController::new(state);
    let response = controller.overstaying(&query).await?;
    Ok(Json(response))
}

async fn analytics(State(state): State<AppState>) -> Result<Json<AnalyticsReport>, AppError> {
    let controller = VehicleController::new(state);
    let response = controller.analytics().await?;
    Ok(Json(response))
}
