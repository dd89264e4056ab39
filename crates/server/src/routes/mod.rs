//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the
//! Romeria server. Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and metrics
//! - `testimonies`: Testimony submission and the public feed
//! - `leads`: Lead-form intake

pub mod health;
pub mod leads;
pub mod testimonies;

use crate::error::{ServerError, ServerResult};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Romeria Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/submit-testimony",
            "/contact-lead",
            "/testimonials",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// Preflight answer for the public POST routes
///
/// The submission forms are served from static hosting on another
/// origin, so browsers probe with OPTIONS before posting.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
