//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_BASE_URL, DEFAULT_BLOCKING_STATUSES, DEFAULT_CHECKPOINT_PATH, DEFAULT_LOG_PATH,
    DEFAULT_RATE_LIMIT, DEFAULT_TABLE, DEFAULT_TIMEOUT_SECS, REQUEST_DELAY,
};

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Run configuration.
///
/// Parsed from the command line by the binary; library callers can construct
/// it programmatically and rely on `Default` for everything they don't care
/// about.
///
/// # Examples
///
/// ```no_run
/// use geo_backfill::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     database: PathBuf::from("sightings.db"),
///     rate_limit: 500,
///     enforce_limit: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "geo_backfill",
    about = "Backfills country names for coordinates in a SQLite table via reverse geocoding."
)]
pub struct Config {
    /// Path to the source SQLite database (read-only)
    #[arg(long, short = 'd')]
    pub database: PathBuf,

    /// Name of the source table containing latitude/longitude columns
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Base URL of the reverse-geocoding service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Path of the CSV checkpoint holding completed records
    #[arg(long, default_value = DEFAULT_CHECKPOINT_PATH)]
    pub checkpoint_path: PathBuf,

    /// Path of the raw JSON lookup log
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    pub log_path: PathBuf,

    /// Maximum number of lookups per run
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT)]
    pub rate_limit: u32,

    /// Whether the usage cap is enforced (the counter always increments)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub enforce_limit: bool,

    /// Delay between lookups in milliseconds
    #[arg(long, default_value_t = REQUEST_DELAY.as_millis() as u64)]
    pub request_delay_ms: u64,

    /// HTTP status codes that halt the run
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_BLOCKING_STATUSES)]
    pub blocking_statuses: Vec<u16>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// The fixed pause between lookup requests.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Whether `status` is in the configured blocking set.
    pub fn is_blocking_status(&self, status: u16) -> bool {
        self.blocking_statuses.contains(&status)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("sightings.db"),
            table: DEFAULT_TABLE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            rate_limit: DEFAULT_RATE_LIMIT,
            enforce_limit: true,
            request_delay_ms: REQUEST_DELAY.as_millis() as u64,
            blocking_statuses: DEFAULT_BLOCKING_STATUSES.to_vec(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
