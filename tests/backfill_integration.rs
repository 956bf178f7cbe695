//! Integration tests for run_backfill
//!
//! These tests verify the end-to-end pipeline against a mock geocoding
//! server: resolution, checkpointed resume, the usage cap, blocking-status
//! early exit, and the not-found sentinel.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geo_backfill::checkpoint::load_checkpoint;
use geo_backfill::error_handling::LookupError;
use geo_backfill::geocode::reverse_lookup;
use geo_backfill::{run_backfill, NOT_FOUND};

use helpers::{create_source_db, test_config};

fn us_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "address": {"country": "United States", "state": "Texas"}
    }))
}

#[tokio::test]
async fn test_full_run_resolves_countries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(us_response())
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(
        &db_path,
        &[
            (29.8830556, -97.9411111),
            (29.38421, -98.581082),
            (28.9783333, -96.6458333),
        ],
    )
    .await;

    let config = test_config(db_path, dir.path(), mock_server.uri());
    let checkpoint_path = config.checkpoint_path.clone();
    let report = run_backfill(config).await.unwrap();

    assert_eq!(report.total_records, 3);
    assert_eq!(report.attempted, 3);
    assert_eq!(report.resolved, 3);
    assert_eq!(report.not_found, 0);
    assert_eq!(report.completed, 3);
    assert_eq!(report.remaining, 0);
    assert!(report.stop_reason.is_none());

    let completed = load_checkpoint(&checkpoint_path);
    assert_eq!(completed.len(), 3);
    assert!(completed
        .iter()
        .all(|r| r.country.as_deref() == Some("United States")));
}

#[tokio::test]
async fn test_resume_makes_no_new_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(us_response())
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(&db_path, &[(29.88, -97.94), (29.38, -98.58)]).await;

    let config = test_config(db_path, dir.path(), mock_server.uri());
    let checkpoint_path = config.checkpoint_path.clone();

    let first = run_backfill(config.clone()).await.unwrap();
    assert_eq!(first.attempted, 2);
    let completed_after_first = load_checkpoint(&checkpoint_path);

    // Second run with no new data: nothing to attempt, identical completed set.
    let second = run_backfill(config).await.unwrap();
    assert_eq!(second.attempted, 0);
    assert_eq!(second.completed, 2);
    assert_eq!(second.remaining, 0);

    let completed_after_second = load_checkpoint(&checkpoint_path);
    assert_eq!(completed_after_first, completed_after_second);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_usage_cap_bounds_attempts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(us_response())
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(
        &db_path,
        &[
            (29.0, -97.0),
            (30.0, -98.0),
            (31.0, -99.0),
            (32.0, -100.0),
            (33.0, -101.0),
        ],
    )
    .await;

    let mut config = test_config(db_path, dir.path(), mock_server.uri());
    config.rate_limit = 2;
    config.enforce_limit = true;

    let report = run_backfill(config).await.unwrap();

    assert_eq!(report.attempted, 2);
    assert_eq!(report.completed, 2);
    assert_eq!(report.remaining, 3);
    assert!(report
        .stop_reason
        .as_deref()
        .unwrap()
        .contains("usage limit"));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_unenforced_cap_does_not_bound_attempts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(us_response())
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(&db_path, &[(29.0, -97.0), (30.0, -98.0), (31.0, -99.0)]).await;

    let mut config = test_config(db_path, dir.path(), mock_server.uri());
    config.rate_limit = 1;
    config.enforce_limit = false;

    let report = run_backfill(config).await.unwrap();
    assert_eq!(report.attempted, 3);
    assert!(report.stop_reason.is_none());
}

#[tokio::test]
async fn test_blocking_status_halts_after_k_minus_one() {
    let mock_server = MockServer::start().await;

    // First two requests succeed, the third gets throttled.
    let counter = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(move |_req: &wiremock::Request| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                us_response()
            } else {
                ResponseTemplate::new(429)
            }
        })
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(
        &db_path,
        &[
            (29.0, -97.0),
            (30.0, -98.0),
            (31.0, -99.0),
            (32.0, -100.0),
            (33.0, -101.0),
        ],
    )
    .await;

    let config = test_config(db_path, dir.path(), mock_server.uri());
    let log_path = config.log_path.clone();
    let report = run_backfill(config).await.unwrap();

    // Blocked on attempt 3: exactly 2 results recorded, the rest untouched.
    assert_eq!(report.attempted, 2);
    assert_eq!(report.completed, 2);
    assert_eq!(report.remaining, 3);
    assert!(report.stop_reason.as_deref().unwrap().contains("429"));

    let raw_log: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&log_path).unwrap()).unwrap();
    assert_eq!(raw_log.len(), 2);
}

#[tokio::test]
async fn test_error_marker_records_sentinel_and_continues() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "Unable to geocode"
        })))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(&db_path, &[(0.0, 0.0), (1.0, 1.0)]).await;

    let config = test_config(db_path, dir.path(), mock_server.uri());
    let checkpoint_path = config.checkpoint_path.clone();
    let report = run_backfill(config).await.unwrap();

    // Not-found coordinates still complete (with the sentinel) and are never
    // re-requested on resume.
    assert_eq!(report.attempted, 2);
    assert_eq!(report.resolved, 0);
    assert_eq!(report.not_found, 2);
    assert_eq!(report.remaining, 0);
    assert!(report.stop_reason.is_none());

    let completed = load_checkpoint(&checkpoint_path);
    assert!(completed
        .iter()
        .all(|r| r.country.as_deref() == Some(NOT_FOUND)));
}

#[tokio::test]
async fn test_transport_failure_halts_gracefully() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(&db_path, &[(29.0, -97.0), (30.0, -98.0)]).await;

    // Port 9 (discard) is never listening; every request fails at connect.
    let config = test_config(db_path, dir.path(), "http://127.0.0.1:9".to_string());
    let checkpoint_path = config.checkpoint_path.clone();
    let report = run_backfill(config).await.unwrap();

    // The failure halts the run like a blocking status: no error, nothing
    // attempted, everything still incomplete for the next resume.
    assert_eq!(report.attempted, 0);
    assert_eq!(report.completed, 0);
    assert_eq!(report.remaining, 2);
    assert!(report
        .stop_reason
        .as_deref()
        .unwrap()
        .contains("Transport error"));

    // The (empty) checkpoint is still persisted.
    assert!(load_checkpoint(&checkpoint_path).is_empty());
}

#[tokio::test]
async fn test_connect_failure_is_retryable() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(&db_path, &[(29.0, -97.0)]).await;
    let config = test_config(db_path, dir.path(), "http://127.0.0.1:9".to_string());

    let client = reqwest::Client::new();
    let err = reverse_lookup(&client, &config, 29.0, -97.0)
        .await
        .unwrap_err();

    // A refused connection is worth resuming immediately, unlike a blocked run.
    assert!(matches!(err, LookupError::Transport(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_non_json_body_halts_with_decode_error() {
    let mock_server = MockServer::start().await;

    // First request succeeds, then the service starts answering with an
    // HTML maintenance page.
    let counter = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(move |_req: &wiremock::Request| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                us_response()
            } else {
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>Down for maintenance</body></html>")
            }
        })
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(&db_path, &[(29.0, -97.0), (30.0, -98.0), (31.0, -99.0)]).await;

    let config = test_config(db_path, dir.path(), mock_server.uri());
    let log_path = config.log_path.clone();
    let report = run_backfill(config).await.unwrap();

    // The undecodable body halts after the one good attempt; the record
    // being attempted stays unresolved and nothing of it hits the raw log.
    assert_eq!(report.attempted, 1);
    assert_eq!(report.completed, 1);
    assert_eq!(report.remaining, 2);
    assert!(report.stop_reason.as_deref().unwrap().contains("decode"));

    let raw_log: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&log_path).unwrap()).unwrap();
    assert_eq!(raw_log.len(), 1);
}

#[tokio::test]
async fn test_resume_after_block_picks_up_where_it_stopped() {
    let mock_server = MockServer::start().await;

    // Request 1 succeeds, request 2 is blocked, everything after succeeds.
    let counter = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(move |_req: &wiremock::Request| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                ResponseTemplate::new(503)
            } else {
                us_response()
            }
        })
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("source.db");
    create_source_db(&db_path, &[(29.0, -97.0), (30.0, -98.0), (31.0, -99.0)]).await;

    let config = test_config(db_path, dir.path(), mock_server.uri());

    let first = run_backfill(config.clone()).await.unwrap();
    assert_eq!(first.completed, 1);
    assert_eq!(first.remaining, 2);
    assert!(first.stop_reason.is_some());

    let second = run_backfill(config).await.unwrap();
    assert_eq!(second.attempted, 2);
    assert_eq!(second.completed, 3);
    assert_eq!(second.remaining, 0);
    assert!(second.stop_reason.is_none());
}
