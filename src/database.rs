//! Read-only access to the source SQLite table.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};

use crate::models::Record;

/// Validates that a table name is a plain SQL identifier.
///
/// Table names cannot be bound as query parameters; this keeps the
/// interpolation below from turning into an injection vector.
fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Invalid table name: {table:?}"))
    }
}

/// Loads all coordinate rows from the source database, read-only.
///
/// Rows are indexed positionally from 0 in the order the table returns them;
/// that order is the row identity the checkpoint resume relies on, so the
/// query carries no ORDER BY that could disagree between runs.
pub async fn load_source_records(db_path: &Path, table: &str) -> Result<Vec<Record>> {
    validate_table_name(table)?;

    info!("Getting original data from database");

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("Failed to open source database {}", db_path.display()))?;

    let query = format!("SELECT latitude, longitude FROM {table}");
    let rows = sqlx::query(&query)
        .fetch_all(&pool)
        .await
        .with_context(|| format!("Failed to query table {table}"))?;

    let records: Vec<Record> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Ok(Record {
                index: i as i64,
                latitude: row.try_get("latitude")?,
                longitude: row.try_get("longitude")?,
                country: None,
            })
        })
        .collect::<Result<_, sqlx::Error>>()
        .context("Failed to read latitude/longitude columns")?;

    info!("Database collected. Size: {}", records.len());

    pool.close().await;
    info!("Database connection closed");

    Ok(records)
}
