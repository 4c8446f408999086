//! Command-line interface for the Reframing Room.
//!
//! Runs the webhook server, the terminal dashboard, and small maintenance
//! commands against the shared state document.

#![deny(missing_docs, unsafe_code)]

/// CLI command definitions and parsing.
pub mod commands;

/// CLI application entry point and configuration.
pub mod app;

/// Error types for CLI operations.
pub mod error;
