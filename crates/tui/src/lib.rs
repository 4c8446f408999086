//! Terminal dashboard for the Reframing Room.
//!
//! Polls the shared state document on a fixed interval and renders the latest
//! reframed message, its conflict indicators and the peace offering. The
//! partner's love language can be changed from the dashboard, and new
//! micro-date ideas generated on demand.

#![deny(missing_docs, unsafe_code)]

/// Dashboard application lifecycle.
pub mod app;

/// Dashboard state and key handling.
pub mod dashboard;

/// Error types for dashboard operations.
pub mod error;

/// Input polling and refresh ticks.
pub mod events;

/// Conflict gauge and pulse computations.
pub mod pulse;

/// Frame rendering.
pub mod ui;

// Re-exports
pub use app::App;
pub use dashboard::{Action, Dashboard, Tab};
pub use error::{Result, TuiError};

use reframe_api::Analyzer;
use reframe_core::config::DashboardConfig;
use reframe_core::StateStore;
use std::sync::Arc;
use std::time::Duration;

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    /// Delay between full refreshes.
    pub poll_interval: Duration,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

impl From<&DashboardConfig> for TuiConfig {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(100)),
        }
    }
}

/// Run the dashboard until the user quits.
///
/// # Errors
/// Returns an error if terminal setup or the event loop fails.
pub fn run(config: TuiConfig, store: Arc<dyn StateStore>, analyzer: Analyzer) -> Result<()> {
    let mut app = App::new(config, store, analyzer)?;
    app.run()
}
