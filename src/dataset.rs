//! Two-bucket dataset bookkeeping.
//!
//! The record set is partitioned at all times into a completed bucket (has a
//! country, including the not-found sentinel) and an incomplete bucket. The
//! split is positional: the checkpoint holds a prefix of the full table, and
//! everything beyond its length is still to do.

use log::info;

use crate::error_handling::MergeError;
use crate::models::{Record, ResolvedCountry};

/// Splits the full record set against a previously checkpointed prefix.
///
/// `incomplete` is exactly the tail of `full` beyond the checkpoint's length.
/// With no checkpoint, everything is incomplete. A checkpoint longer than the
/// source table (source shrank between runs) is clamped to the table length.
pub fn split_resumed(full: Vec<Record>, checkpoint: Vec<Record>) -> (Vec<Record>, Vec<Record>) {
    let resume_at = checkpoint.len().min(full.len());
    let incomplete: Vec<Record> = full.into_iter().skip(resume_at).collect();
    let completed = checkpoint;

    info!(
        "Parsed completed / incomplete datasets | Completed: {} | Incomplete: {}",
        completed.len(),
        incomplete.len()
    );

    (completed, incomplete)
}

/// Folds newly resolved countries into the completed bucket.
///
/// The country list covers the leading records of `incomplete` (the loop
/// attempts records in order and may stop early); it is padded with `None` to
/// the bucket's full length before partitioning. Records that gained a country
/// are appended to `completed`; the rest form the new incomplete bucket.
///
/// Each resolved country carries the index it was resolved for, and the merge
/// verifies it matches the record it lands on. A mismatch means the buckets
/// and the loop output drifted apart, and attaching countries positionally
/// would corrupt the dataset silently.
pub fn merge_countries(
    completed: &mut Vec<Record>,
    incomplete: Vec<Record>,
    countries: Vec<ResolvedCountry>,
) -> Result<Vec<Record>, MergeError> {
    if countries.len() > incomplete.len() {
        return Err(MergeError::CountrySurplus {
            countries: countries.len(),
            incomplete: incomplete.len(),
        });
    }

    info!(
        "Adding country list to data with list size: {}",
        countries.len()
    );
    info!(
        "Completed original size: {} | Incomplete original size: {}",
        completed.len(),
        incomplete.len()
    );

    for (position, (resolved, record)) in countries.iter().zip(incomplete.iter()).enumerate() {
        if resolved.index != record.index {
            return Err(MergeError::IndexMismatch {
                position,
                resolved_index: resolved.index,
                record_index: record.index,
            });
        }
    }

    let mut padded: Vec<Option<String>> =
        countries.into_iter().map(|r| Some(r.country)).collect();
    padded.resize(incomplete.len(), None);

    let mut remaining = Vec::new();
    for (mut record, country) in incomplete.into_iter().zip(padded) {
        record.country = country;
        if record.is_resolved() {
            completed.push(record);
        } else {
            remaining.push(record);
        }
    }

    info!(
        "Completed new size: {} | Incomplete new size: {}",
        completed.len(),
        remaining.len()
    );

    Ok(remaining)
}
