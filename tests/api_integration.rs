//! API Integration Tests for rfcloud
//!
//! End-to-end tests covering the readings API against a running server.

use rfcloud::{AppState, Connector, ReadingStore, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tokio::net::TcpListener;

// =============================================================================
// Test Helpers
// =============================================================================

/// Start test server on a fresh on-disk database and return base URL.
async fn start_test_server() -> (String, TempDir) {
    let dir = tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite:{}", dir.path().join("api.db").display());
    let store = ReadingStore::new(Arc::new(Connector::with_url(url)));
    let app = create_router(AppState { store });

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://{}", addr), dir)
}

/// Submit one reading payload.
async fn submit(client: &reqwest::Client, base: &str, payload: &Value) -> reqwest::Response {
    client
        .post(format!("{base}/api/readings"))
        .json(payload)
        .send()
        .await
        .expect("Failed to send request")
}

// =============================================================================
// Health Probe Tests
// =============================================================================

#[tokio::test]
async fn test_health_probes() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ready");
}

// =============================================================================
// Submit Tests
// =============================================================================

#[tokio::test]
async fn test_submit_and_fetch_roundtrip() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = submit(
        &client,
        &base,
        &json!({
            "frequency_hz": 915_000_000.0,
            "signal_dbm": -71.5,
            "classification": "LORA",
            "timestamp": 1_700_000_000_000_i64,
        }),
    )
    .await;

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Saved");
    assert_eq!(body["data"]["frequency_hz"], 915_000_000.0);
    assert_eq!(body["data"]["signal_dbm"], -71.5);
    assert_eq!(body["data"]["classification"], "LORA");
    assert_eq!(body["data"]["timestamp"], 1_700_000_000_000_i64);

    let resp = client
        .get(format!("{base}/api/readings"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["classification"], "LORA");
}

#[tokio::test]
async fn test_submit_aliases_and_defaults() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let before = chrono::Utc::now().timestamp_millis();
    let resp = submit(
        &client,
        &base,
        &json!({ "frequency": 2_400_000_000_i64, "signalStrength": "-42" }),
    )
    .await;
    let after = chrono::Utc::now().timestamp_millis();

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["frequency_hz"], 2_400_000_000.0);
    assert_eq!(body["data"]["signal_dbm"], -42.0);
    assert_eq!(body["data"]["classification"], "UNKNOWN");

    // The missing timestamp is filled with the server clock.
    let ts = body["data"]["timestamp"].as_i64().unwrap();
    assert!(ts >= before && ts <= after);
}

#[tokio::test]
async fn test_submit_validation_rejected() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = submit(
        &client,
        &base,
        &json!({ "frequency_hz": "garbage", "signal_dbm": -50 }),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Invalid numeric fields (frequency_hz, signal_dbm)"
    );

    let resp = client
        .get(format!("{base}/api/readings"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_submit_malformed_body() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/readings"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Malformed JSON payload");
}

// =============================================================================
// Query Tests
// =============================================================================

#[tokio::test]
async fn test_query_range_and_sort() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    for ts in [100, 200, 300, 400, 500] {
        let resp = submit(
            &client,
            &base,
            &json!({ "frequency_hz": 100_000_000, "signal_dbm": -60, "timestamp": ts }),
        )
        .await;
        assert_eq!(resp.status(), 201);
    }

    // Both bounds are inclusive.
    let resp = client
        .get(format!("{base}/api/readings?from=200&to=400"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let timestamps: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["timestamp"].as_i64().unwrap())
        .collect();
    assert_eq!(timestamps, vec![200, 300, 400]);

    let resp = client
        .get(format!("{base}/api/readings?sort=desc&limit=2"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let timestamps: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["timestamp"].as_i64().unwrap())
        .collect();
    assert_eq!(timestamps, vec![500, 400]);
}

#[tokio::test]
async fn test_query_limit_leniency() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    for ts in [10, 20, 30, 40, 50] {
        submit(
            &client,
            &base,
            &json!({ "frequency_hz": 100_000_000, "signal_dbm": -60, "timestamp": ts }),
        )
        .await;
    }

    // Oversized limits are capped, not rejected.
    let resp = client
        .get(format!("{base}/api/readings?limit=10000"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    // Unparsable limits fall back to the default.
    let resp = client
        .get(format!("{base}/api/readings?limit=lots"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    // Zero is raised to the minimum of one row.
    let resp = client
        .get(format!("{base}/api/readings?limit=0"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Protocol Tests
// =============================================================================

#[tokio::test]
async fn test_method_not_allowed() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .delete(format!("{base}/api/readings"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 405);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Only GET, POST, OPTIONS allowed");
}

#[tokio::test]
async fn test_cors_preflight() {
    let (base, _dir) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .request(reqwest::Method::OPTIONS, format!("{base}/api/readings"))
        .header("Origin", "http://dashboard.example")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
