//! Core types, errors, configuration and shared state storage for the
//! Reframing Room.
//!
//! The webhook server and the terminal dashboard both build on this crate:
//! the server appends analyzed messages to the state store, the dashboard
//! polls it and edits the stored preference.

pub mod config;
pub mod error;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::ReframeConfig;
pub use error::{Error, Result};
pub use store::{JsonFileStore, StateStore};
pub use types::*;
