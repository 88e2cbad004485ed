//! Web server module for the reading API.
//!
//! Provides the HTTP surface: reading submission and query on one route,
//! permissive CORS for browser dashboards, and health probes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::reading::{Reading, ValidationError};
use crate::storage::{ReadingQuery, ReadingStore, SortOrder, StorageError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: ReadingStore,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    db: Option<String>,
}

/// Query parameters for the readings API.
///
/// All fields arrive as raw strings and are parsed leniently: a value that
/// does not coerce is treated as absent rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingsQueryParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body is not decodable JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// Payload decoded but failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage layer failure, tagged with the operation that hit it.
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        source: StorageError,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            Self::MalformedPayload(err) => (
                StatusCode::BAD_REQUEST,
                "Malformed JSON payload".to_string(),
                err.to_string(),
            ),
            Self::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "Invalid numeric fields (frequency_hz, signal_dbm)".to_string(),
                err.to_string(),
            ),
            Self::Storage { context, source } => {
                // Configuration and connect failures share one message so
                // clients see the same diagnosis for both.
                let message = if source.is_connect_failure() {
                    "Database connection failed"
                } else {
                    *context
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message.to_string(),
                    source.to_string(),
                )
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (
            status,
            Json(json!({
                "success": false,
                "message": message,
                "error": detail,
            })),
        )
            .into_response()
    }
}

/// Parse an epoch-ms bound, keeping only finite positive values.
fn parse_bound(raw: Option<&str>) -> Option<i64> {
    let ms = raw?.trim().parse::<f64>().ok()?;
    (ms.is_finite() && ms > 0.0).then_some(ms as i64)
}

/// Parse a requested limit; non-numeric values fall back to the default cap.
fn parse_limit(raw: Option<&str>) -> Option<i64> {
    let n = raw?.trim().parse::<f64>().ok()?;
    n.is_finite().then_some(n as i64)
}

/// Parse sort order; anything that is not `desc` sorts ascending.
fn parse_sort(raw: Option<&str>) -> SortOrder {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let app_state = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route(
            "/api/readings",
            get(query_handler)
                .post(submit_handler)
                .options(options_handler)
                .fallback(method_not_allowed),
        )
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(cors)
        .with_state(app_state)
}

/// Submit one reading.
async fn submit_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Value = serde_json::from_slice(&body)?;
    let reading = Reading::normalize(&payload, chrono::Utc::now().timestamp_millis())?;

    state
        .store
        .insert(&reading)
        .await
        .map_err(|source| ApiError::Storage {
            context: "Save failed",
            source,
        })?;

    tracing::debug!(
        frequency_hz = reading.frequency_hz,
        signal_dbm = reading.signal_dbm,
        classification = %reading.classification,
        "Reading saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Saved", "data": reading })),
    )
        .into_response())
}

/// Query readings filtered by time range.
async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadingsQueryParams>,
) -> Result<Response, ApiError> {
    let query = ReadingQuery {
        from: parse_bound(params.from.as_deref()),
        to: parse_bound(params.to.as_deref()),
        limit: parse_limit(params.limit.as_deref()),
        order: parse_sort(params.sort.as_deref()),
    };

    let readings = state
        .store
        .query(query)
        .await
        .map_err(|source| ApiError::Storage {
            context: "Fetch failed",
            source,
        })?;

    Ok(Json(json!({ "success": true, "data": readings })).into_response())
}

/// Acknowledge a bare OPTIONS request; preflights are answered by the CORS
/// layer before reaching this handler.
async fn options_handler() -> StatusCode {
    StatusCode::OK
}

/// Reject unsupported methods with the canonical envelope.
async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "success": false,
            "message": "Only GET, POST, OPTIONS allowed",
        })),
    )
        .into_response()
}

/// Liveness probe.
async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        db: None,
    })
}

/// Readiness probe that checks database availability.
async fn readyz_handler(State(state): State<Arc<AppState>>) -> Response {
    let db_status = state
        .store
        .query(ReadingQuery {
            limit: Some(1),
            ..Default::default()
        })
        .await
        .map(|_| "ready".to_string())
        .map_err(|e| e.to_string());

    match db_status {
        Ok(db) => Json(HealthResponse {
            status: "ok".to_string(),
            db: Some(db),
        })
        .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "not_ready".to_string(),
                    db: Some(err),
                }),
            )
                .into_response()
        }
    }
}
