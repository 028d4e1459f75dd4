use serde::{Deserialize, Serialize};

use crate::models::vehicle::VehicleType;

/// What the OCR endpoint read off an uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub vehicle_no: Option<String>,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub vehicle_type: VehicleType,
    /// Seconds spent in the engine, two decimals
    pub processing_time: f64,
}
