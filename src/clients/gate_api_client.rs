//! Typed client for the gate REST API
//!
//! Used by the operator console and the integration tests. Every call is a
//! single request/response; callers re-fetch to refresh their state.

use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::dto::ocr_dto::OcrResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, CreateVehicleResponse, ExitResponse, HealthResponse};
use crate::models::vehicle::{Plant, VehicleRecord};
use crate::services::type_classifier::{FirstLetterClassifier, VehicleClassifier};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The plate already has an open stay
    #[error("{message}")]
    DuplicateEntry { vehicle_no: String, message: String },

    #[error("network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("server answered {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ClientError::DuplicateEntry { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Reads `GATE_API_BASE_URL`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = std::env::var("GATE_API_BASE_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            config.base_url = url;
        }
        config
    }
}

pub struct GateApiClient {
    client: Client,
    base_url: String,
    classifier: Box<dyn VehicleClassifier>,
}

impl GateApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            classifier: Box::new(FirstLetterClassifier),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        // 503 still carries a health body
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return decode(response).await;
        }
        decode(ensure_success(response).await?).await
    }

    /// Current collection. Records that fail to decode are skipped so one bad
    /// row cannot hide the rest.
    pub async fn fetch_vehicles(&self) -> Result<Vec<VehicleRecord>, ClientError> {
        let response = ensure_success(self.client.get(self.url("/vehicles")).send().await?).await?;
        let raw: Vec<Value> = decode(response).await?;
        Ok(decode_records(raw))
    }

    /// Open a record. The type is classified here before the request goes out.
    pub async fn register(
        &self,
        vehicle_no: &str,
        container_id: Option<&str>,
        plant: Plant,
    ) -> Result<CreateVehicleResponse, ClientError> {
        let vehicle_no = vehicle_no.trim();
        if vehicle_no.is_empty() {
            return Err(ClientError::InvalidInput("vehicle number is required".to_string()));
        }
        let container_id = container_id.map(str::trim).filter(|c| !c.is_empty());

        let request = CreateVehicleRequest {
            vehicle_no: vehicle_no.to_string(),
            container_id: container_id.map(str::to_string),
            plant,
            vehicle_type: Some(self.classifier.classify(vehicle_no, container_id)),
        };

        let response = self.client.post(self.url("/vehicles")).json(&request).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if is_duplicate_signal(&body) {
            return Err(ClientError::DuplicateEntry {
                vehicle_no: vehicle_no.to_string(),
                message: message_of(&body)
                    .unwrap_or_else(|| format!("⚠️ Vehicle {} is already inside.", vehicle_no)),
            });
        }
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                message: message_of(&body).unwrap_or(text),
            });
        }

        serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn mark_exit(&self, id: &str) -> Result<ExitResponse, ClientError> {
        let url = self.url(&format!("/vehicles/{}/exit", urlencoding::encode(id)));
        let response = ensure_success(self.client.put(url).send().await?).await?;
        decode(response).await
    }

    /// Upload an image to the OCR endpoint
    pub async fn recognize_plate(&self, image: Vec<u8>, file_name: &str) -> Result<OcrResponse, ClientError> {
        if image.is_empty() {
            return Err(ClientError::InvalidInput("image is empty".to_string()));
        }
        let part = multipart::Part::bytes(image).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = ensure_success(self.client.post(self.url("/ocr")).multipart(form).send().await?).await?;
        decode(response).await
    }
}

/// Decode each element on its own, dropping the ones that do not parse
fn decode_records(raw: Vec<Value>) -> Vec<VehicleRecord> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<VehicleRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("⚠️ Skipping malformed vehicle record: {}", e);
                None
            }
        })
        .collect()
}

/// A rejected registration is a duplicate only when the body says so; other
/// conflicts keep their status
fn is_duplicate_signal(body: &Value) -> bool {
    body.get("status").and_then(Value::as_str) == Some("duplicate")
        || body.get("code").and_then(Value::as_str) == Some("DUPLICATE_ENTRY")
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| message_of(&body))
        .unwrap_or(text);
    log::error!("❌ API answered {}: {}", status, message);
    Err(ClientError::UnexpectedStatus {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}
