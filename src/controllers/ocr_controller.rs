use std::time::Instant;

use crate::dto::ocr_dto::OcrResponse;
use crate::metrics;
use crate::services::ocr_service::OcrError;
use crate::services::plate_parser::detect_plate_and_container;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct OcrController {
    state: AppState,
}

impl OcrController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn recognize(&self, image: &[u8], content_type: Option<&str>) -> AppResult<OcrResponse> {
        let recognizer = self.state.recognizer.as_ref().ok_or_else(|| {
            metrics::OCR_REQUESTS.with_label_values(&["unavailable"]).inc();
            AppError::ServiceUnavailable("No OCR engine is configured".to_string())
        })?;

        let started = Instant::now();
        let text = match recognizer.recognize_text(image, content_type).await {
            Ok(text) => text,
            Err(OcrError::EmptyImage) => {
                metrics::OCR_REQUESTS.with_label_values(&["rejected"]).inc();
                return Err(AppError::BadRequest("The uploaded image is empty".to_string()));
            }
            Err(e) => {
                metrics::OCR_REQUESTS.with_label_values(&["failed"]).inc();
                return Err(AppError::ExternalApi(e.to_string()));
            }
        };
        let processing_time = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;

        let detection = detect_plate_and_container(text.as_deref().unwrap_or(""), self.state.classifier.as_ref());
        metrics::OCR_REQUESTS.with_label_values(&["ok"]).inc();
        log::info!(
            "📷 OCR read plate {:?}, container {:?} in {:.2}s",
            detection.vehicle_no,
            detection.container_id,
            processing_time
        );

        Ok(OcrResponse {
            text,
            vehicle_no: detection.vehicle_no,
            container_id: detection.container_id,
            vehicle_type: detection.vehicle_type,
            processing_time,
        })
    }
}
