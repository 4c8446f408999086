use crate::store::DEFAULT_STATE_FILE;
use crate::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the text-generation credential.
pub const ENV_API_KEY: &str = "GROQ_API_KEY";
/// Environment variable overriding the model name.
pub const ENV_MODEL: &str = "GROQ_MODEL";
/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding the listen host.
pub const ENV_HOST: &str = "HOST";
/// Environment variable overriding the state file location.
pub const ENV_STATE_FILE: &str = "REFRAME_STATE_FILE";

/// Main configuration for the Reframing Room.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReframeConfig {
    /// Webhook HTTP server configuration.
    pub http: HttpConfig,

    /// Shared state storage configuration.
    pub storage: StorageConfig,

    /// Text-generation service configuration.
    pub llm: LlmConfig,

    /// Dashboard configuration.
    pub dashboard: DashboardConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to bind to.
    pub port: u16,

    /// Request timeout in seconds.
    pub request_timeout: u64,

    /// Enable request logging.
    pub enable_request_logging: bool,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

/// Shared state storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON state document.
    pub state_file: PathBuf,
}

/// Text-generation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API credential. Absent means degraded (mock) mode.
    pub api_key: Option<String>,

    /// Model identifier.
    pub model: String,

    /// OpenAI-compatible API base URL.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Delay between full refreshes, in milliseconds.
    pub poll_interval_ms: u64,
}

impl ReframeConfig {
    /// Conventional location of the user configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reframe").join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| Error::Toml(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Toml(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable source.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.llm.api_key = Some(key.trim().to_string());
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.llm.model = model.trim().to_string();
        }
        if let Some(host) = non_empty(ENV_HOST) {
            self.http.host = host.trim().to_string();
        }
        if let Some(port) = non_empty(ENV_PORT) {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|e| Error::config(format!("invalid {} '{}': {}", ENV_PORT, port, e)))?;
        }
        if let Some(path) = non_empty(ENV_STATE_FILE) {
            self.storage.state_file = PathBuf::from(path);
        }
        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout: 60,
            enable_request_logging: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_KEY, " gsk_test "),
            (ENV_PORT, "5000"),
            (ENV_STATE_FILE, "/tmp/reframe/state.json"),
        ]
        .into_iter()
        .collect();

        let mut config = ReframeConfig::default();
        config
            .apply_env_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.http.port, 5000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(
            config.storage.state_file,
            PathBuf::from("/tmp/reframe/state.json")
        );
    }

    #[test]
    fn blank_credential_keeps_degraded_mode() {
        let mut config = ReframeConfig::default();
        config
            .apply_env_from(|key| (key == ENV_API_KEY).then(|| "   ".to_string()))
            .unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let mut config = ReframeConfig::default();
        let err = config
            .apply_env_from(|key| (key == ENV_PORT).then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn partial_toml_fills_defaults_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\nport = 9000\n\n[dashboard]\npoll_interval_ms = 500\n")
            .unwrap();

        let config = ReframeConfig::load(&path).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.dashboard.poll_interval_ms, 500);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");

        let copy = dir.path().join("copy").join("config.toml");
        config.save(&copy).unwrap();
        assert_eq!(ReframeConfig::load(&copy).unwrap().http.port, 9000);
    }
}
