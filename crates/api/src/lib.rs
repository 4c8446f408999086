//! Webhook server for the Reframing Room.
//!
//! Incoming chat messages are reframed by an external text-generation service,
//! appended to the shared state document and answered with a TwiML reply.
//! The [`analysis::Analyzer`] is also used by the dashboard for micro-date
//! suggestions.

#![deny(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod llm;
pub mod router;
pub mod server;
pub mod webhook;

pub use analysis::Analyzer;
pub use config::ApiConfig;
pub use error::*;
pub use router::*;
pub use server::*;
