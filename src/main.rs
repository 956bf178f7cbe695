//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geo_backfill` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use geo_backfill::initialization::init_logger_with;
use geo_backfill::{run_backfill, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Run the backfill using the library
    match run_backfill(config).await {
        Ok(report) => {
            println!(
                "Attempted {} lookup{} ({} resolved, {} not found) in {:.1}s",
                report.attempted,
                if report.attempted == 1 { "" } else { "s" },
                report.resolved,
                report.not_found,
                report.elapsed_seconds
            );
            println!(
                "Completed {}/{} records ({} remaining); checkpoint saved to {}",
                report.completed,
                report.total_records,
                report.remaining,
                report.checkpoint_path.display()
            );
            if let Some(reason) = report.stop_reason {
                println!("Run stopped early: {reason} - resume by running again");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("geo_backfill error: {:#}", e);
            process::exit(1);
        }
    }
}
