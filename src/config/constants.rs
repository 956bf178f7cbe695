//! Configuration constants.
//!
//! Defaults for the enrichment run: API endpoint, usage cap, inter-request
//! delay, and on-disk locations for the checkpoint and raw log.

use std::time::Duration;

/// Default reverse-geocoding endpoint base URL.
pub const DEFAULT_BASE_URL: &str = "https://geocode.maps.co";

/// Default usage cap per run.
///
/// The free tier of the geocoding service allows well below this, but the cap
/// exists to bound a runaway run rather than to model the provider's quota
/// precisely. Override via `--rate-limit` for stricter budgets.
pub const DEFAULT_RATE_LIMIT: u32 = 90_000;

/// Fixed pause between lookup requests.
///
/// The provider throttles aggressively at ~2 req/s; 500ms keeps us under that.
pub const REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Default path for the CSV checkpoint holding the completed bucket.
pub const DEFAULT_CHECKPOINT_PATH: &str = "data/backup.csv";

/// Default path for the raw JSON lookup log.
pub const DEFAULT_LOG_PATH: &str = "data/geo_data.json";

/// Default source table name.
pub const DEFAULT_TABLE: &str = "sightings";

/// Per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP status codes that halt the run when returned by the geocoding service.
///
/// 401/403 mean the key is bad or revoked, 429 means we are being throttled,
/// 503 means the service is down. None of these resolve by continuing the loop.
pub const DEFAULT_BLOCKING_STATUSES: [u16; 4] = [401, 403, 429, 503];
