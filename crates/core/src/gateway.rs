//! Analysis service client.
//!
//! One external call: submit the captured still as multipart form data,
//! parse the JSON envelope, classify success or failure. Success requires
//! both a transport-level OK status and a payload-level success indicator
//! with a result body; everything else is a gateway error carrying the
//! payload's message when one is available. No retries; recovery is the
//! caller's decision.

use crate::analysis::AnalysisResult;
use crate::config::Config;
use crate::error::{AppError, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// Status value the payload must carry for a result to be accepted.
const STATUS_SUCCESS: &str = "success";

/// Response envelope of the analysis endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<AnalysisResult>,
}

/// Client for the palm analysis endpoint.
pub struct AnalysisClient {
    endpoint: String,
    client: reqwest::Client,
}

impl AnalysisClient {
    pub fn new(config: &Config) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Submits PNG bytes as a multipart form (file field `file`) and
    /// returns the parsed result. Single attempt.
    pub async fn submit(&self, png: Vec<u8>) -> Result<AnalysisResult> {
        let part = Part::bytes(png)
            .file_name("hand_capture.png")
            .mime_str("image/png")
            .map_err(|e| AppError::gateway(format!("Failed to build request: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::gateway(format!("Failed to read response: {}", e)))?;

        classify_response(status.is_success(), status.as_u16(), &body)
    }
}

/// Maps a transport outcome and response body to a result.
///
/// Kept free of I/O so every combination the contract names is testable
/// without a server.
fn classify_response(http_ok: bool, status: u16, body: &str) -> Result<AnalysisResult> {
    let envelope: Option<Envelope> = serde_json::from_str(body).ok();

    if !http_ok {
        let message = envelope
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("Server returned status {}", status));
        return Err(AppError::gateway(message));
    }

    let Some(envelope) = envelope else {
        return Err(AppError::gateway("Server returned an unreadable response"));
    };

    if envelope.status != STATUS_SUCCESS {
        let message = envelope.message.unwrap_or_else(|| {
            "The palm could not be recognized. Please retake a clearer photo.".to_string()
        });
        return Err(AppError::gateway(message));
    }

    envelope
        .data
        .ok_or_else(|| AppError::gateway("Server reported success without result data"))
}
