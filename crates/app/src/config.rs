//! Application configuration

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::cli::Command;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "EATEASE_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// EatEase cart CLI configuration
#[derive(Debug, Parser)]
#[command(name = "eatease", about = "EatEase cart CLI", long_about = None)]
pub struct AppConfig {
    /// Product catalog (YAML)
    #[arg(long, env = "EATEASE_CATALOG", global = true, default_value = "fixtures/catalog.yml")]
    pub catalog: PathBuf,

    /// Cart state file (JSON); carts are kept in memory when omitted
    #[arg(long, env = "EATEASE_STATE", global = true)]
    pub state: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
