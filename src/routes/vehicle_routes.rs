use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{CreateVehicleRequest, CreateVehicleResponse, ExitResponse};
use crate::models::vehicle::VehicleRecord;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Mounted at the `/api` level; the collection answers with and without a
/// trailing slash
pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route("/vehicles/", get(list_vehicles).post(create_vehicle))
        .route("/vehicles/:id/exit", put(mark_exit))
}

async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<VehicleRecord>>, AppError> {
    let controller = VehicleController::new(state);
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<CreateVehicleResponse>), AppError> {
    let controller = VehicleController::new(state);
    let response = controller.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn mark_exit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExitResponse>, AppError> {
    let controller = VehicleController::new(state);
    let response = controller.mark_exit(&id).await?;
    Ok(Json(response))
}
