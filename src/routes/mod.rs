//! HTTP routes
//!
//! Everything the gate UI calls lives under `/api`; `/metrics` sits at the root.

pub mod dashboard_routes;
pub mod ocr_routes;
pub mod report_routes;
pub mod vehicle_routes;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::HealthResponse;
use crate::metrics;
use crate::middleware::cors::cors_layer;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let api = Router::new()
        .route("/health", get(health))
        .merge(vehicle_routes::create_vehicle_router())
        .merge(ocr_routes::create_ocr_router())
        .nest("/reports", report_routes::create_report_router())
        .merge(dashboard_routes::create_dashboard_router());

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(metrics_text))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = VehicleController::new(state).health().await;
    let status = if response.status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json::<HealthResponse>(response))
}

async fn metrics_text() -> impl IntoResponse {
    match metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            log::error!("❌ Metrics encoding failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                String::new(),
            )
        }
    }
}
