//! Checkpoint persistence.
//!
//! Two artifacts survive across runs: the completed bucket as a CSV table
//! (read back at startup to determine the resume position) and the raw lookup
//! log as a JSON array of `{index, request}` objects. Read failures of either
//! are never fatal; a missing or unreadable checkpoint just means starting
//! from scratch.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::models::{LookupEntry, Record};

/// Loads the completed bucket from the CSV checkpoint.
///
/// Any failure (missing file, malformed rows) falls back to an empty
/// checkpoint so the run starts from the beginning of the source table.
pub fn load_checkpoint(path: &Path) -> Vec<Record> {
    info!("Getting backup data from csv");

    match try_load_checkpoint(path) {
        Ok(records) => records,
        Err(e) => {
            info!("Backup unavailable ({e:#}). Creating dataset from database");
            Vec::new()
        }
    }
}

fn try_load_checkpoint(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open checkpoint {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: Record = result.context("Malformed checkpoint row")?;
        records.push(record);
    }
    Ok(records)
}

/// Writes the completed bucket to the CSV checkpoint, creating parent
/// directories as needed.
pub fn save_checkpoint(path: &Path, completed: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create checkpoint directory {}", parent.display())
            })?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create checkpoint {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for record in completed {
        writer.serialize(record).context("Failed to write checkpoint row")?;
    }
    writer.flush().context("Failed to flush checkpoint")?;

    info!("Backup successfully saved");
    Ok(())
}

/// Loads the raw lookup log, or an empty one if it is missing or unreadable.
///
/// New entries from this run are appended to whatever is loaded here, so a
/// resumed run extends the same JSON array rather than replacing it.
pub fn load_raw_log(path: &Path) -> Vec<LookupEntry> {
    info!("Retrieving JSON data");

    match try_load_raw_log(path) {
        Ok(entries) => {
            info!("JSON data exists. Appending to existing");
            entries
        }
        Err(e) => {
            info!("JSON data unavailable ({e:#}). Starting from scratch");
            Vec::new()
        }
    }
}

fn try_load_raw_log(path: &Path) -> Result<Vec<LookupEntry>> {
    let file = File::open(path)?;
    let entries = serde_json::from_reader(file)?;
    Ok(entries)
}

/// Writes the full raw lookup log as one JSON array.
pub fn save_raw_log(path: &Path, entries: &[LookupEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create raw log {}", path.display()))?;
    serde_json::to_writer(file, entries).context("Failed to write raw log")?;

    info!("JSON data exported");
    Ok(())
}
