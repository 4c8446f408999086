//! Configuration for the webhook HTTP server.

use reframe_core::ReframeConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Fallback listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Socket address to bind to.
    pub bind_addr: SocketAddr,

    /// Request timeout in seconds. Zero disables the timeout layer.
    pub request_timeout_seconds: u64,

    /// Enable request logging.
    pub enable_request_logging: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            request_timeout_seconds: 60,
            enable_request_logging: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ApiConfig {
    /// Create API configuration from the core configuration.
    pub fn from_core_config(core_config: &ReframeConfig) -> Self {
        let http = &core_config.http;
        let default_addr = Self::default().bind_addr;

        Self {
            bind_addr: format!("{}:{}", http.host, http.port)
                .parse()
                .unwrap_or_else(|_| {
                    tracing::warn!(
                        "invalid listen address {}:{}, falling back to {}",
                        http.host,
                        http.port,
                        DEFAULT_BIND_ADDR
                    );
                    default_addr
                }),
            request_timeout_seconds: http.request_timeout,
            enable_request_logging: http.enable_request_logging,
            max_body_size: http.max_body_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_core_config_uses_host_and_port() {
        let mut core = ReframeConfig::default();
        core.http.host = "127.0.0.1".to_string();
        core.http.port = 5000;
        core.http.request_timeout = 5;

        let config = ApiConfig::from_core_config(&core);
        assert_eq!(config.bind_addr, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.request_timeout_seconds, 5);
    }

    #[test]
    fn unparseable_host_falls_back_to_default_addr() {
        let mut core = ReframeConfig::default();
        core.http.host = "not a host".to_string();
        let config = ApiConfig::from_core_config(&core);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
    }
}
