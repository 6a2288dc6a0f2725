use crate::error::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use url::Url;

/// Default analysis endpoint (local backend).
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/hand/analyze";

#[derive(Clone, Debug)]
pub struct Config {
    /// Full URL of the palm analysis endpoint.
    pub endpoint: String,
    /// Preferred camera device index.
    pub camera_index: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let endpoint = env::var("PALM_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Url::parse(&endpoint)
            .map_err(|e| AppError::config(format!("PALM_API_URL is not a valid URL: {}", e)))?;

        let camera_index = env::var("PALM_CAMERA")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        Ok(Self {
            endpoint,
            camera_index,
        })
    }

    /// Returns a copy with the endpoint replaced, re-validating the URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint)
            .map_err(|e| AppError::config(format!("Invalid endpoint URL: {}", e)))?;
        self.endpoint = endpoint;
        Ok(self)
    }

    /// Returns a copy with the preferred camera index replaced.
    pub fn with_camera_index(mut self, index: u32) -> Self {
        self.camera_index = index;
        self
    }
}
