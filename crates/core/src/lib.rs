//! Palm-Read Core Library
//!
//! This library implements the client-side flow of a camera-based palm and
//! face reading application: capture a photo, submit it to the remote
//! analysis service, and render the returned lines, mounts and narrative
//! report as an interactive overlay with a swipeable report.
//!
//! # Overview
//!
//! - **Scene flow**: login → profile → mode choice → capture → loading →
//!   result, owned by [`scene::SceneController`]
//! - **Camera capture**: live preview and PNG stills via [`capture`]
//! - **Analysis service**: one multipart HTTP call via [`gateway`]
//! - **Report segmentation**: HTML blob → ordered cards via [`report`]
//! - **Result rendering**: overlay and pager via [`ui`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`PalmRead`] facade:
//!
//! ```ignore
//! use palm_read_core::PalmRead;
//!
//! // Initialize with environment configuration
//! let app = PalmRead::new()?;
//!
//! // Launch the interactive flow
//! app.run()?;
//! ```
//!
//! # Module Structure
//!
//! - [`analysis`]: result types returned by the analysis service
//! - [`capture`]: camera session with explicit stream lifecycle
//! - [`config`]: configuration loading and management
//! - [`error`]: error types and result aliases
//! - [`gateway`]: analysis service client
//! - [`report`]: report markup segmentation
//! - [`scene`]: scene state machine and session state
//! - [`ui`]: user interface components

pub mod analysis;
pub mod capture;
pub mod config;
pub mod error;
pub mod gateway;
pub mod report;
pub mod scene;
pub mod ui;

// Re-export primary types for convenience
pub use analysis::AnalysisResult;
pub use capture::CaptureSession;
pub use config::Config;
pub use error::{AppError, Result};
pub use gateway::AnalysisClient;
pub use report::{ReportCard, parse_report_cards};
pub use scene::{Scene, SceneController};

use nokhwa::utils::ApiBackend;

/// Main entry point for the palm reading application.
///
/// This struct provides a facade over the various subsystems, handling
/// initialization and orchestration. It's the recommended way to use the
/// library for most use cases.
pub struct PalmRead {
    config: Config,
}

impl PalmRead {
    /// Creates a new instance with environment-based configuration
    /// (including `.env` files).
    ///
    /// # Errors
    ///
    /// Returns an error if the configured endpoint is not a valid URL.
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self { config })
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Lists available cameras with their index and name.
    pub fn list_cameras(&self) -> Result<Vec<String>> {
        let devices = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| AppError::device(format!("Failed to enumerate cameras: {}", e)))?;
        Ok(devices
            .iter()
            .map(|d| format!("Camera {}: {}", d.index(), d.human_name()))
            .collect())
    }

    /// Launches the interactive scene flow.
    pub fn run(&self) -> Result<()> {
        ui::run_app(self.config.clone())
    }

    /// Submits an already-captured image to the analysis service and
    /// returns the result with its segmented report cards.
    ///
    /// Useful for headless operation and for exercising the gateway
    /// without a camera.
    pub async fn analyze_bytes(&self, png: Vec<u8>) -> Result<(AnalysisResult, Vec<ReportCard>)> {
        let client = AnalysisClient::new(&self.config);
        let result = client.submit(png).await?;
        let cards = parse_report_cards(&result.report, &result.line_order());
        Ok((result, cards))
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other
/// functions. This loads `.env` files if present.
pub fn init() {
    let _ = dotenvy::dotenv();
}
