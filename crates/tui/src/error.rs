//! Error types for dashboard operations.

use thiserror::Error;

/// Main error type for dashboard operations.
#[derive(Error, Debug)]
pub enum TuiError {
    /// Terminal initialization error.
    #[error("Terminal initialization error: {0}")]
    TerminalInit(String),

    /// Event handling error.
    #[error("Event handling error: {0}")]
    Event(String),

    /// UI rendering error.
    #[error("UI rendering error: {0}")]
    Render(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias for dashboard operations.
pub type Result<T> = std::result::Result<T, TuiError>;
