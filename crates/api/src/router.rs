//! Axum router configuration for the webhook server.

use crate::analysis::Analyzer;
use axum::Router;
use reframe_core::StateStore;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Shared state document.
    pub store: Arc<dyn StateStore>,
    /// Analysis adapter.
    pub analyzer: Analyzer,
}

impl AppState {
    pub fn new(store: Arc<dyn StateStore>, analyzer: Analyzer) -> Self {
        Self { store, analyzer }
    }
}

/// Build the main router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(crate::webhook::router())
        .route("/health", axum::routing::get(health_check))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
