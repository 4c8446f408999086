//! CLI command definitions for the Reframing Room.

use clap::{Args, Parser, Subcommand};
use reframe_core::LoveLanguage;
use std::path::PathBuf;

/// Environment variable pointing at the TOML configuration file.
pub const ENV_CONFIG: &str = "REFRAME_CONFIG";

/// Main CLI application.
#[derive(Parser, Debug)]
#[command(name = "reframe", author, version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity
    #[arg(short, long, global = true, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Shared state file path
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the inbound-message webhook server
    Serve(ServeArgs),

    /// Run the terminal dashboard
    Dashboard(DashboardArgs),

    /// Inspect or edit the shared state document
    State(StateArgs),
}

/// Webhook server arguments.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Dashboard arguments.
#[derive(Args, Debug, Default)]
pub struct DashboardArgs {
    /// Refresh interval in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

/// State document arguments.
#[derive(Args, Debug)]
pub struct StateArgs {
    /// State subcommand
    #[command(subcommand)]
    pub command: StateCommand,
}

/// State document subcommands.
#[derive(Subcommand, Debug)]
pub enum StateCommand {
    /// Print the current document as JSON
    Show,

    /// Set the partner's love language
    SetLanguage {
        /// One of the five love languages, e.g. "Quality Time"
        language: LoveLanguage,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["reframe", "-vv", "serve", "--host", "127.0.0.1", "-p", "9000"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
                assert_eq!(args.port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_global_state_file_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reframe",
            "dashboard",
            "--interval-ms",
            "500",
            "--state-file",
            "/tmp/state.json",
        ])
        .unwrap();
        assert_eq!(cli.state_file, Some(PathBuf::from("/tmp/state.json")));
        assert!(matches!(
            cli.command,
            Commands::Dashboard(DashboardArgs {
                interval_ms: Some(500)
            })
        ));
    }

    #[test]
    fn parses_love_language_argument() {
        let cli = Cli::try_parse_from(["reframe", "state", "set-language", "quality time"]).unwrap();
        match cli.command {
            Commands::State(StateArgs {
                command: StateCommand::SetLanguage { language },
            }) => assert_eq!(language, LoveLanguage::QualityTime),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_love_language() {
        let result = Cli::try_parse_from(["reframe", "state", "set-language", "Telepathy"]);
        assert!(result.is_err());
    }
}
