use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;
use store::DocumentBackend;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(json!({
        "status": "healthy",
        "service": "romeria-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
    }))
}

/// Readiness check endpoint
/// Returns 200 if server is ready to accept requests
pub async fn readiness_check<B: DocumentBackend>(
    State(state): State<Arc<ServerState<B>>>,
) -> ServerResult<impl IntoResponse> {
    // The store and lead database are reached lazily per request, so
    // readiness only asserts configuration is in place.
    let store_status = if state.pipeline.store.dry_run {
        "dry-run"
    } else {
        "ready"
    };

    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Ok(Json(json!({
        "status": "ready",
        "service": "romeria-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
        "components": {
            "api": "ready",
            "store": store_status,
        }
    })))
}

/// Prometheus metrics endpoint
///
/// Renders the installed recorder's gauges and counters as Prometheus
/// text. Answers 404 when metrics are disabled.
pub async fn metrics<B: DocumentBackend>(
    State(state): State<Arc<ServerState<B>>>,
) -> ServerResult<impl IntoResponse> {
    match &state.metrics {
        Some(handle) => Ok(handle.render()),
        None => Err(ServerError::NotFound),
    }
}
