// Shared test helpers for source database setup and test configuration.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::{Path, PathBuf};

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use geo_backfill::{Config, LogFormat, LogLevel};

/// Creates a source SQLite database with a `sightings` table holding the
/// given coordinate pairs.
#[allow(dead_code)] // Used by other test files
pub async fn create_source_db(path: &Path, coords: &[(f64, f64)]) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to create source database");

    sqlx::query("CREATE TABLE sightings (latitude REAL, longitude REAL)")
        .execute(&pool)
        .await
        .expect("Failed to create sightings table");

    for (lat, lon) in coords {
        sqlx::query("INSERT INTO sightings (latitude, longitude) VALUES (?, ?)")
            .bind(lat)
            .bind(lon)
            .execute(&pool)
            .await
            .expect("Failed to insert coordinate row");
    }

    pool.close().await;
}

/// Builds a Config pointed at a temp directory and a mock geocoding server,
/// with no inter-request delay so tests run fast.
#[allow(dead_code)] // Used by other test files
pub fn test_config(database: PathBuf, artifacts_dir: &Path, base_url: String) -> Config {
    Config {
        database,
        base_url,
        checkpoint_path: artifacts_dir.join("backup.csv"),
        log_path: artifacts_dir.join("geo_data.json"),
        request_delay_ms: 0,
        timeout_seconds: 5,
        log_level: LogLevel::Error, // Reduce noise in tests
        log_format: LogFormat::Plain,
        ..Default::default()
    }
}
