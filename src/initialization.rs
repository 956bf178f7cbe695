//! Startup helpers: logger and HTTP client initialization.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::LevelFilter;
use reqwest::ClientBuilder;

use crate::config::{Config, LogFormat};

/// Initializes the global logger with the requested level and format.
///
/// Safe to call once per process; a second call returns an error from the
/// `log` facade, which callers can ignore in tests.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    if let LogFormat::Json = format {
        builder.format(|buf, record| {
            let line = serde_json::json!({
                "ts": chrono::Utc::now().to_rfc3339(),
                "level": record.level().to_string(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{line}")
        });
    }

    builder.try_init().context("Failed to initialize logger")
}

/// Builds the shared HTTP client used for geocoding lookups.
pub async fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(Arc::new(client))
}
