use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::DashboardQuery;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_report_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles.csv", get(export_vehicles_csv))
        .route("/vehicles/:id", get(vehicle_report))
}

/// `/vehicles/{id}` is the printable page, `/vehicles/{id}.pdf` the PDF download
async fn vehicle_report(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, AppError> {
    let controller = VehicleController::new(state);

    if let Some(id) = id.strip_suffix(".pdf") {
        let (pdf, vehicle_no) = controller.report_pdf(id).await?;
        let disposition = format!("attachment; filename=\"{}.pdf\"", download_name(&vehicle_no));
        return Ok((
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            pdf,
        )
            .into_response());
    }

    let html = controller.report_html(&id).await?;
    Ok(Html(html).into_response())
}

fn download_name(vehicle_no: &str) -> String {
    let name: String = vehicle_no
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        "vehicle".to_string()
    } else {
        name
    }
}

async fn export_vehicles_csv(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let controller = VehicleController::new(state);
    let csv = controller.export_csv(&query).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"vehicles.csv\""),
        ],
        csv,
    ))
}
