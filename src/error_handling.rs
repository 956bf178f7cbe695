//! Typed errors and per-run outcome statistics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::Error as ReqwestError;
use strum::IntoEnumIterator;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for a single geocoding lookup.
///
/// `Blocked` and `Transport` both halt the run; the distinction matters for
/// the operator. A blocked run should wait out the quota window or fix the
/// key, while a retryable transport failure (timeout, connection reset) can
/// simply be resumed immediately.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The service returned one of the configured blocking status codes.
    #[error("Received blocking status code: {status}")]
    Blocked {
        /// The offending HTTP status code.
        status: u16,
    },

    /// Transport-level failure (timeout, connection error, etc.).
    #[error("Transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// The response body was not valid JSON.
    #[error("Response decode error: {0}")]
    Decode(ReqwestError),
}

impl LookupError {
    /// Whether resuming the run immediately is likely to make progress.
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Blocked { .. } => false,
            LookupError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LookupError::Decode(_) => false,
        }
    }
}

/// Error types for the merge step.
#[derive(Error, Debug, PartialEq)]
pub enum MergeError {
    /// A resolved country's index does not match the incomplete record it
    /// would be attached to. Positional trust would silently corrupt the
    /// dataset here, so the merge refuses instead.
    #[error("Index misalignment at position {position}: resolved index {resolved_index} vs record index {record_index}")]
    IndexMismatch {
        /// Position in the country list where the mismatch was detected.
        position: usize,
        /// Index carried by the resolved country.
        resolved_index: i64,
        /// Index of the incomplete record at that position.
        record_index: i64,
    },

    /// More resolved countries than incomplete records to attach them to.
    #[error("Country list length {countries} exceeds incomplete bucket size {incomplete}")]
    CountrySurplus {
        /// Number of resolved countries.
        countries: usize,
        /// Number of incomplete records.
        incomplete: usize,
    },
}

/// Per-lookup outcomes tracked over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum LookupOutcome {
    /// A country was extracted from the response.
    Resolved,
    /// The response carried an error marker; sentinel recorded.
    NotFound,
    /// A blocking status code halted the run.
    Blocked,
    /// A transport failure halted the run.
    TransportError,
    /// An undecodable response body halted the run.
    DecodeError,
}

impl LookupOutcome {
    /// Human-readable label for summary output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Resolved => "resolved",
            LookupOutcome::NotFound => "not found",
            LookupOutcome::Blocked => "blocked by status code",
            LookupOutcome::TransportError => "transport error",
            LookupOutcome::DecodeError => "decode error",
        }
    }
}

/// Outcome counters for one run.
///
/// Uses atomic counters keyed by [`LookupOutcome`]; all outcomes are
/// initialized to zero on creation so `increment`/`get_count` never miss.
pub struct RunStats {
    outcomes: HashMap<LookupOutcome, AtomicUsize>,
}

impl RunStats {
    /// Creates a tracker with every outcome at zero.
    pub fn new() -> Self {
        let mut outcomes = HashMap::new();
        for outcome in LookupOutcome::iter() {
            outcomes.insert(outcome, AtomicUsize::new(0));
        }
        RunStats { outcomes }
    }

    /// Records one occurrence of `outcome`.
    pub fn increment(&self, outcome: LookupOutcome) {
        // All LookupOutcome variants are initialized in new(), so unwrap() is safe
        self.outcomes
            .get(&outcome)
            .unwrap()
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current count for `outcome`.
    pub fn get_count(&self, outcome: LookupOutcome) -> usize {
        self.outcomes.get(&outcome).unwrap().load(Ordering::SeqCst)
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs the non-zero outcome counters at the end of a run.
pub fn log_outcome_statistics(stats: &RunStats) {
    for outcome in LookupOutcome::iter() {
        let count = stats.get_count(outcome);
        if count > 0 {
            log::info!("Lookups {}: {}", outcome.as_str(), count);
        }
    }
}
