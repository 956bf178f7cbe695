//! geo_backfill library: resumable reverse-geocoding backfill
//!
//! This library reads coordinate rows from a SQLite table, resolves each pair
//! to a country name via a reverse-geocoding HTTP API, and maintains a
//! two-bucket dataset (completed / incomplete) that is checkpointed to disk
//! and resumed across runs.
//!
//! # Example
//!
//! ```no_run
//! use geo_backfill::{run_backfill, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     database: std::path::PathBuf::from("sightings.db"),
//!     rate_limit: 1000,
//!     ..Default::default()
//! };
//!
//! let report = run_backfill(config).await?;
//! println!("Completed {} of {} records", report.completed, report.total_records);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

mod app;
pub mod checkpoint;
pub mod config;
pub mod database;
pub mod dataset;
pub mod error_handling;
pub mod geocode;
pub mod initialization;
pub mod models;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use models::{LookupEntry, Record, ResolvedCountry, NOT_FOUND};
pub use run::{run_backfill, BackfillReport};

// Internal run module (contains the driver logic)
mod run {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use chrono::Utc;
    use log::{info, warn};

    use crate::app::log_progress;
    use crate::checkpoint::{load_checkpoint, load_raw_log, save_checkpoint, save_raw_log};
    use crate::config::Config;
    use crate::database::load_source_records;
    use crate::dataset::{merge_countries, split_resumed};
    use crate::error_handling::{log_outcome_statistics, LookupOutcome, RunStats};
    use crate::geocode::{locate_loop, LoopExit};
    use crate::initialization::init_client;

    /// Results of one backfill run.
    #[derive(Debug, Clone)]
    pub struct BackfillReport {
        /// Number of rows in the source table.
        pub total_records: usize,
        /// Size of the completed bucket after the merge.
        pub completed: usize,
        /// Size of the incomplete bucket after the merge.
        pub remaining: usize,
        /// Number of lookups attempted this run.
        pub attempted: usize,
        /// Lookups that resolved to a country this run.
        pub resolved: usize,
        /// Lookups recorded with the not-found sentinel this run.
        pub not_found: usize,
        /// Why the loop stopped early, if it did.
        pub stop_reason: Option<String>,
        /// Path of the CSV checkpoint that was written.
        pub checkpoint_path: PathBuf,
        /// Elapsed time in seconds.
        pub elapsed_seconds: f64,
    }

    /// Runs a backfill with the provided configuration.
    ///
    /// Sequences the whole pipeline: load the source table, split it against
    /// the checkpoint, run the enrichment loop over the incomplete bucket,
    /// merge the newly resolved countries, and persist both the checkpoint
    /// and the raw lookup log.
    ///
    /// # Errors
    ///
    /// Returns an error if the source database cannot be read, the merge
    /// detects an index misalignment, or either persistence file cannot be
    /// written. A blocking status or transport failure during the loop is
    /// *not* an error: the run halts gracefully, persists its progress, and
    /// reports the reason in [`BackfillReport::stop_reason`].
    pub async fn run_backfill(config: Config) -> Result<BackfillReport> {
        let start_time = std::time::Instant::now();
        info!("Beginning run at {}", Utc::now());

        let full = load_source_records(&config.database, &config.table)
            .await
            .context("Failed to load source records")?;
        let total_records = full.len();

        let checkpoint = load_checkpoint(&config.checkpoint_path);
        let (mut completed, incomplete) = split_resumed(full, checkpoint);

        let mut raw_log = load_raw_log(&config.log_path);

        let client = init_client(&config)
            .await
            .context("Failed to initialize HTTP client")?;

        let stats = RunStats::new();
        let result = locate_loop(&client, &config, &incomplete, &mut raw_log, &stats).await;
        let attempted = result.countries.len();

        let remaining = merge_countries(&mut completed, incomplete, result.countries)
            .context("Merge step refused to combine buckets")?;

        save_checkpoint(&config.checkpoint_path, &completed)
            .context("Failed to save checkpoint")?;
        save_raw_log(&config.log_path, &raw_log).context("Failed to save raw log")?;

        log_progress(start_time, attempted);
        log_outcome_statistics(&stats);

        let stop_reason = match result.exit {
            LoopExit::Exhausted => None,
            LoopExit::UsageLimit => {
                Some(format!("usage limit of {} reached", config.rate_limit))
            }
            LoopExit::Failed(e) => {
                warn!("Run halted early: {e}");
                Some(e.to_string())
            }
        };

        Ok(BackfillReport {
            total_records,
            completed: completed.len(),
            remaining: remaining.len(),
            attempted,
            resolved: stats.get_count(LookupOutcome::Resolved),
            not_found: stats.get_count(LookupOutcome::NotFound),
            stop_reason,
            checkpoint_path: config.checkpoint_path.clone(),
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }
}
