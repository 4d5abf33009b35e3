//! Command-line interface
//!
//! Argument parsing for the `msgexport` binary.

pub mod commands;

use clap::{Parser, Subcommand};

/// msgexport - stream stored search results out of Elasticsearch
#[derive(Parser, Debug)]
#[command(name = "msgexport")]
#[command(version, about, long_about = None)]
#[command(author = "msgexport Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "msgexport.toml", env = "MSGEXPORT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MSGEXPORT_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the messages of a stored search as NDJSON
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Write a sample configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["msgexport", "export", "--search", "search.json"]);
        assert_eq!(cli.config, "msgexport.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_export_requires_search() {
        assert!(Cli::try_parse_from(["msgexport", "export"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from([
            "msgexport",
            "--config",
            "custom.toml",
            "export",
            "--search",
            "s.json",
        ]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["msgexport", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["msgexport", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["msgexport", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
