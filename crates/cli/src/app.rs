//! CLI application entry point and configuration.
//!
//! Resolves the layered configuration (defaults, TOML file, environment,
//! command-line flags), installs logging, and dispatches the subcommand.

use crate::commands::{Cli, Commands, DashboardArgs, ServeArgs, StateCommand};
use crate::error::{CliError, Result};
use clap::Parser;
use reframe_api::{Analyzer, ApiConfig, ApiServer, AppState};
use reframe_core::{JsonFileStore, LoveLanguage, ReframeConfig, Settings, StateStore};
use reframe_tui::TuiConfig;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

/// Log file used while the dashboard owns the terminal.
pub const DASHBOARD_LOG_FILE: &str = "reframe-dashboard.log";

/// Main CLI application.
#[derive(Debug)]
pub struct App {
    /// Resolved configuration.
    pub config: ReframeConfig,
    /// Parsed CLI arguments.
    pub cli: Cli,
}

impl App {
    /// Create a new application instance from command line arguments.
    pub fn new() -> Result<Self> {
        let cli = Cli::parse();
        Self::from_cli(cli)
    }

    /// Create an application instance from already parsed arguments.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let config = Self::load_config(&cli, |key| std::env::var(key).ok())?;
        Ok(Self { config, cli })
    }

    /// Load configuration from file, environment and flags, in that order.
    pub fn load_config<F>(cli: &Cli, lookup: F) -> Result<ReframeConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &cli.config {
            Some(path) if path.exists() => ReframeConfig::load(path)
                .map_err(|e| CliError::Config(e.to_string()))?,
            Some(path) => {
                return Err(CliError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            None => match ReframeConfig::default_path().filter(|p| p.exists()) {
                Some(path) => ReframeConfig::load(&path)
                    .map_err(|e| CliError::Config(e.to_string()))?,
                None => ReframeConfig::default(),
            },
        };

        config
            .apply_env_from(lookup)
            .map_err(|e| CliError::Config(e.to_string()))?;

        if let Some(state_file) = &cli.state_file {
            config.storage.state_file = state_file.clone();
        }

        match &cli.command {
            Commands::Serve(ServeArgs { host, port }) => {
                if let Some(host) = host {
                    let host = host.trim();
                    if host.is_empty() {
                        return Err(CliError::Argument("host must not be empty".to_string()));
                    }
                    config.http.host = host.to_string();
                }
                if let Some(port) = port {
                    config.http.port = *port;
                }
            }
            Commands::Dashboard(DashboardArgs { interval_ms }) => {
                if let Some(interval_ms) = interval_ms {
                    if *interval_ms == 0 {
                        return Err(CliError::Argument(
                            "interval must be greater than zero".to_string(),
                        ));
                    }
                    config.dashboard.poll_interval_ms = *interval_ms;
                }
            }
            Commands::State(_) => {}
        }

        Ok(config)
    }

    /// Run the application.
    pub fn run(self) -> Result<()> {
        self.setup_logging();
        debug!(state_file = %self.config.storage.state_file.display(), "configuration resolved");

        match &self.cli.command {
            Commands::Serve(_) => self.handle_serve(),
            Commands::Dashboard(_) => self.handle_dashboard(),
            Commands::State(args) => match &args.command {
                StateCommand::Show => self.handle_state_show(),
                StateCommand::SetLanguage { language } => self.handle_set_language(*language),
            },
        }
    }

    /// Set up logging based on verbosity level.
    fn setup_logging(&self) {
        let level = match self.cli.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };

        let builder = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false);

        // The dashboard owns the terminal, so its logs go to a file.
        let installed = if matches!(self.cli.command, Commands::Dashboard(_)) {
            match OpenOptions::new()
                .create(true)
                .append(true)
                .open(DASHBOARD_LOG_FILE)
            {
                Ok(file) => builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init(),
                Err(_) => builder.with_writer(std::io::sink).try_init(),
            }
        } else {
            builder.with_writer(std::io::stderr).try_init()
        };
        installed.ok(); // Ignore errors if a subscriber is already installed
    }

    fn store(&self) -> Arc<dyn StateStore> {
        Arc::new(JsonFileStore::new(self.state_file()))
    }

    fn state_file(&self) -> PathBuf {
        self.config.storage.state_file.clone()
    }

    fn analyzer(&self) -> Result<Analyzer> {
        Analyzer::from_config(&self.config.llm).map_err(|e| CliError::Config(e.to_string()))
    }

    fn handle_serve(&self) -> Result<()> {
        let api_config = ApiConfig::from_core_config(&self.config);
        let state = AppState::new(self.store(), self.analyzer()?);
        let server = ApiServer::new(api_config, state);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Internal(e.to_string()))?;

        runtime
            .block_on(server.run())
            .map_err(|e| CliError::Server(e.to_string()))
    }

    fn handle_dashboard(&self) -> Result<()> {
        let tui_config = TuiConfig::from(&self.config.dashboard);
        info!(
            interval_ms = tui_config.poll_interval.as_millis() as u64,
            "opening dashboard"
        );
        reframe_tui::run(tui_config, self.store(), self.analyzer()?)
            .map_err(|e| CliError::Dashboard(e.to_string()))
    }

    fn handle_state_show(&self) -> Result<()> {
        let document = self.store().read();
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| CliError::Internal(e.to_string()))?;
        println!("{}", json);
        Ok(())
    }

    fn handle_set_language(&self, language: LoveLanguage) -> Result<()> {
        self.store()
            .update_settings(Settings {
                love_language: language,
            })
            .map_err(|e| CliError::Internal(e.to_string()))?;
        println!(
            "Love language set to {} in {}",
            language,
            self.state_file().display()
        );
        Ok(())
    }
}

/// Parse arguments, load `.env`, and run the selected command.
pub fn run() -> Result<()> {
    // Loaded before parsing so REFRAME_CONFIG can come from `.env`.
    dotenvy::dotenv().ok();
    App::new()?.run()
}
