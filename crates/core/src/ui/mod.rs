//! User interface for the palm reading flow.
//!
//! The UI is split into focused submodules:
//! - [`state`]: events delivered by the background analysis task
//! - [`forms`]: login, profile and mode-choice scenes
//! - [`overlay`]: result overlay co-registered with the captured image
//! - [`pager`]: swipeable report cards and the bottom sheet
//! - [`flow`]: the main application driving the scene state machine
//!
//! # Usage
//!
//! ```ignore
//! use palm_read_core::{Config, ui};
//!
//! let config = Config::load()?;
//! ui::run_app(config)?;
//! ```

mod flow;
mod forms;
pub mod overlay;
pub mod pager;
mod state;

// Public API exports
pub use flow::PalmFlowApp;
pub use overlay::OverlayRenderer;
pub use pager::{ReportPager, SheetHeight};

use crate::config::Config;
use crate::error::{AppError, Result};
use eframe::egui;

/// Launches the interactive palm reading application and blocks until
/// the window closes.
pub fn run_app(config: Config) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([430.0, 880.0])
            .with_min_inner_size([360.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Palm Read",
        options,
        Box::new(move |_cc| Ok(Box::new(PalmFlowApp::new(config)) as Box<dyn eframe::App>)),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}
