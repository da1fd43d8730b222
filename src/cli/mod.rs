//! Command-line interface for segment-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading (`.env`, config file, environment) and CLI overrides
//! - Subcommands (version, completion, config)

pub mod completion;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::error::Result;

/// Export customer segment members to CSV
#[derive(Parser, Debug)]
#[command(
    name = "segment-export",
    version,
    about = "Fetch customer segment members and export them to CSV",
    long_about = "Fetches one page of customer segment members from a commerce platform's
GraphQL Admin API and writes them as a CSV report to a file or stdout.

The store domain and access token are read from SEGMENT_EXPORT_DOMAIN and
SEGMENT_EXPORT_ACCESS_TOKEN (a .env file is honored), or from the config file."
)]
pub struct CliArgs {
    /// Segment filter expression, passed to the API verbatim
    #[arg(short = 'q', long, value_name = "FILTER")]
    pub query: Option<String>,

    /// Number of customers to fetch
    #[arg(short = 'f', long, value_name = "N")]
    pub first: Option<u32>,

    /// Sort key for results
    #[arg(short = 's', long = "sort-key", alias = "sortKey", value_name = "KEY")]
    pub sort_key: Option<String>,

    /// Reverse sort order (true or false)
    #[arg(short = 'r', long, value_name = "BOOL")]
    pub reverse: Option<bool>,

    /// Output CSV file; use "-" for stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<String>,

    /// Store domain (overrides SEGMENT_EXPORT_DOMAIN)
    #[arg(long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Admin API version
    #[arg(long, value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Deadline for the whole run in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for segment-export
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        // A missing .env file is not an error
        let _ = dotenvy::dotenv();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and environment, then apply arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_fetch_args(config, args);
        Self::apply_api_args(config, args);
        Self::apply_logging_args(config, args);
    }

    /// Apply fetch-related CLI arguments to configuration
    fn apply_fetch_args(config: &mut Config, args: &CliArgs) {
        if let Some(query) = &args.query {
            config.fetch.query = query.clone();
        }
        if let Some(first) = args.first {
            config.fetch.first = first;
        }
        if let Some(sort_key) = &args.sort_key {
            config.fetch.sort_key = sort_key.clone();
        }
        if let Some(reverse) = args.reverse {
            config.fetch.reverse = reverse;
        }
        if let Some(output) = &args.output {
            config.fetch.output = output.clone();
        }
    }

    /// Apply API-related CLI arguments to configuration
    fn apply_api_args(config: &mut Config, args: &CliArgs) {
        if let Some(domain) = &args.domain {
            config.api.domain = Some(domain.clone());
        }
        if let Some(version) = &args.api_version {
            config.api.api_version = version.clone();
        }
        if let Some(timeout) = args.timeout {
            config.api.timeout_secs = timeout;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show }) => {
                if *show {
                    self.show_config()?;
                } else {
                    println!("Configuration file: {}", self.get_config_path().display());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("segment-export version {}", env!("CARGO_PKG_VERSION"));
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml_redacted()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = parse(&["segment-export"]);
        assert!(args.query.is_none());
        assert!(args.reverse.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let args = parse(&[
            "segment-export",
            "-q",
            "customer_tags CONTAINS 'vip'",
            "-f",
            "10",
            "-s",
            "name",
            "-r",
            "false",
            "-o",
            "-",
        ]);
        assert_eq!(args.query.as_deref(), Some("customer_tags CONTAINS 'vip'"));
        assert_eq!(args.first, Some(10));
        assert_eq!(args.sort_key.as_deref(), Some("name"));
        assert_eq!(args.reverse, Some(false));
        assert_eq!(args.output.as_deref(), Some("-"));
    }

    #[test]
    fn test_sort_key_alias() {
        let args = parse(&["segment-export", "--sortKey", "updated_at"]);
        assert_eq!(args.sort_key.as_deref(), Some("updated_at"));
    }

    #[test]
    fn test_args_override_config() {
        let args = parse(&[
            "segment-export",
            "--first",
            "7",
            "--reverse",
            "false",
            "--domain",
            "cli.example.com",
            "--timeout",
            "12",
            "-v",
        ]);
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);

        assert_eq!(config.fetch.first, 7);
        assert!(!config.fetch.reverse);
        assert_eq!(config.api.domain.as_deref(), Some("cli.example.com"));
        assert_eq!(config.api.timeout_secs, 12);
        assert_eq!(config.logging.level, LogLevel::Debug);
        // Untouched values keep their defaults
        assert_eq!(config.fetch.sort_key, "amount_spent");
    }

    #[test]
    fn test_quiet_lowers_log_level() {
        let args = parse(&["segment-export", "--quiet"]);
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Error);
    }

    #[test]
    fn test_subcommands_parse() {
        let args = parse(&["segment-export", "completion", "zsh"]);
        assert!(matches!(args.command, Some(Commands::Completion { ref shell }) if shell == "zsh"));

        let args = parse(&["segment-export", "config", "--show"]);
        assert!(matches!(args.command, Some(Commands::Config { show: true })));
    }

    #[test]
    fn test_invalid_first_rejected_by_parser() {
        assert!(CliArgs::try_parse_from(["segment-export", "--first", "-3"]).is_err());
    }
}
