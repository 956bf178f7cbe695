//! Core data types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Country value recorded when the geocoding service returns an error marker
/// instead of an address for a coordinate pair.
///
/// A record carrying this sentinel still counts as completed: the service was
/// asked once and had no answer, so re-requesting it on resume would waste quota.
pub const NOT_FOUND: &str = "not_found";

/// One row of the source table, tagged with its stable 0-based position.
///
/// The `country` field starts out `None` and is attached at most once, either
/// as a resolved country name or as the [`NOT_FOUND`] sentinel. Once it is
/// `Some`, the record belongs to the completed bucket and is never re-requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable row identity (position in the source table).
    pub index: i64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Resolved country name, if any.
    pub country: Option<String>,
}

impl Record {
    /// Whether this record has a country attached (including the sentinel).
    pub fn is_resolved(&self) -> bool {
        self.country.is_some()
    }
}

/// A country resolved by the enrichment loop, tagged with the index of the
/// record it was resolved for so the merge step can verify alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCountry {
    /// Index of the originating record.
    pub index: i64,
    /// Country name or the [`NOT_FOUND`] sentinel.
    pub country: String,
}

/// Raw geocoding payload tagged with the originating record index.
///
/// Entries are append-only: one per attempted lookup, never mutated afterwards.
/// The on-disk raw log is a JSON array of these objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupEntry {
    /// Index of the record the payload belongs to.
    pub index: i64,
    /// The geocoding response body, verbatim.
    pub request: serde_json::Value,
}
