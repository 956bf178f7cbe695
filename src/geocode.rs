//! The enrichment loop: sequential reverse-geocoding lookups.
//!
//! One HTTP GET per incomplete record, in order, with a fixed pause between
//! requests. The loop stops early when the usage cap is hit (if enforced) or
//! when the service answers with a blocking status or a transport failure;
//! everything attempted so far is kept so a resumed run picks up where this
//! one stopped.

use log::{info, warn};
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error_handling::{LookupError, LookupOutcome, RunStats};
use crate::models::{LookupEntry, Record, ResolvedCountry, NOT_FOUND};

/// Why the enrichment loop stopped.
#[derive(Debug)]
pub enum LoopExit {
    /// Every incomplete record was attempted.
    Exhausted,
    /// The usage cap was reached; remaining records stay unresolved.
    UsageLimit,
    /// A blocking status or transport failure halted the loop. The record
    /// being attempted stays unresolved.
    Failed(LookupError),
}

/// Output of one pass of the enrichment loop.
pub struct LocateResult {
    /// One entry per attempted record, aligned to the leading incomplete
    /// records in order. The caller pads to the full bucket length on merge.
    pub countries: Vec<ResolvedCountry>,
    /// Why the loop stopped.
    pub exit: LoopExit,
}

/// Issues a single reverse-geocoding request.
///
/// Blocking statuses are checked before the body is touched; any other status
/// is treated as a payload to parse (the service reports "no result" via an
/// `error` field in a JSON body, not via status codes).
pub async fn reverse_lookup(
    client: &Client,
    config: &Config,
    latitude: f64,
    longitude: f64,
) -> Result<Value, LookupError> {
    let url = format!("{}/reverse", config.base_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
        ])
        .send()
        .await?;

    let status = response.status().as_u16();
    if config.is_blocking_status(status) {
        return Err(LookupError::Blocked { status });
    }

    response.json::<Value>().await.map_err(LookupError::Decode)
}

/// Extracts `address.country` from a geocoding payload.
///
/// Returns `None` for payloads carrying an error marker, and also for the odd
/// payload that has neither an error nor a country (offshore coordinates).
pub fn extract_country(payload: &Value) -> Option<String> {
    if payload.get("error").is_some() {
        return None;
    }
    payload
        .get("address")
        .and_then(|address| address.get("country"))
        .and_then(|country| country.as_str())
        .map(str::to_string)
}

/// Runs the enrichment loop over the incomplete bucket.
///
/// Raw payloads are appended to `raw_log` (tagged by record index) for every
/// attempted record, resolved or not. The usage counter always increments per
/// attempt; the cap is only enforced when `config.enforce_limit` is set.
pub async fn locate_loop(
    client: &Client,
    config: &Config,
    incomplete: &[Record],
    raw_log: &mut Vec<LookupEntry>,
    stats: &RunStats,
) -> LocateResult {
    let mut countries = Vec::new();
    let total = incomplete.len();
    let mut usage: u32 = 1;

    info!("Beginning to locate countries");

    for record in incomplete {
        if config.enforce_limit && usage > config.rate_limit {
            info!("Usage Limit Hit: {}/{}", usage - 1, config.rate_limit);
            return LocateResult {
                countries,
                exit: LoopExit::UsageLimit,
            };
        }

        let payload = match reverse_lookup(client, config, record.latitude, record.longitude).await
        {
            Ok(payload) => payload,
            Err(e) => {
                match &e {
                    LookupError::Blocked { status } => {
                        stats.increment(LookupOutcome::Blocked);
                        warn!("Received status Code: {status}");
                    }
                    LookupError::Transport(cause) => {
                        stats.increment(LookupOutcome::TransportError);
                        warn!(
                            "Transport failure ({}retryable): {cause}",
                            if e.is_retryable() { "" } else { "not " }
                        );
                    }
                    LookupError::Decode(cause) => {
                        stats.increment(LookupOutcome::DecodeError);
                        warn!("Undecodable response: {cause}");
                    }
                }
                return LocateResult {
                    countries,
                    exit: LoopExit::Failed(e),
                };
            }
        };

        raw_log.push(LookupEntry {
            index: record.index,
            request: payload.clone(),
        });

        let country = match extract_country(&payload) {
            Some(country) => {
                stats.increment(LookupOutcome::Resolved);
                info!(
                    "Usage: {}/{} | Index: [{}/{}] | Coords: ({}, {}) | Address: {}",
                    usage,
                    config.rate_limit,
                    record.index,
                    total - 1,
                    record.latitude,
                    record.longitude,
                    country
                );
                country
            }
            None => {
                stats.increment(LookupOutcome::NotFound);
                info!(
                    "Usage: {}/{} | Index: [{}/{}] | Coords: ({}, {}) | Address: None Found",
                    usage,
                    config.rate_limit,
                    record.index,
                    total - 1,
                    record.latitude,
                    record.longitude
                );
                NOT_FOUND.to_string()
            }
        };

        countries.push(ResolvedCountry {
            index: record.index,
            country,
        });

        usage += 1;

        tokio::time::sleep(config.request_delay()).await;
    }

    LocateResult {
        countries,
        exit: LoopExit::Exhausted,
    }
}
