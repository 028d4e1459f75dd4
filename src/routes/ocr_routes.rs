use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};

use crate::controllers::ocr_controller::OcrController;
use crate::dto::ocr_dto::OcrResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Largest accepted camera image
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Mounted at the `/api` level; gate cameras post to `/ocr/`
pub fn create_ocr_router() -> Router<AppState> {
    Router::new()
        .route("/ocr", post(recognize))
        .route("/ocr/", post(recognize))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
}

async fn recognize(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<OcrResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read uploaded file: {}", e)))?;

        let controller = OcrController::new(state);
        let response = controller.recognize(&bytes, content_type.as_deref()).await?;
        return Ok(Json(response));
    }

    Err(AppError::BadRequest("Multipart field 'file' is required".to_string()))
}
