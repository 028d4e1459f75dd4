//! OCR engine integration
//!
//! Text recognition is an external capability. The gate only needs
//! `image -> text?`; which engine answers is a deployment decision.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR engine returned status {0}")]
    Status(u16),

    #[error("empty image")]
    EmptyImage,
}

#[async_trait]
pub trait PlateRecognizer: Send + Sync {
    /// Raw text found in the image, `None` when nothing was recognised
    async fn recognize_text(&self, image: &[u8], content_type: Option<&str>) -> Result<Option<String>, OcrError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OcrEngineRequest<'a> {
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct OcrEngineResponse {
    #[serde(default)]
    text: Option<String>,
}

/// OCR engine reached over HTTP: base64 image in, `{ "text": ... }` out
pub struct HttpOcrEngine {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOcrEngine {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PlateRecognizer for HttpOcrEngine {
    async fn recognize_text(&self, image: &[u8], content_type: Option<&str>) -> Result<Option<String>, OcrError> {
        if image.is_empty() {
            return Err(OcrError::EmptyImage);
        }

        log::info!("📷 Sending {} bytes to OCR engine {}", image.len(), self.endpoint);
        let payload = OcrEngineRequest {
            image: STANDARD.encode(image),
            content_type,
            language: "en",
        };

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::error!("❌ OCR engine answered {}", status);
            return Err(OcrError::Status(status.as_u16()));
        }

        let body: OcrEngineResponse = response.json().await?;
        Ok(body.text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()))
    }
}
