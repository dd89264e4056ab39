//! Testimony submission and the public testimonial feed.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::json;

use romeria::PipelineError;
use store::DocumentBackend;
use submission::{RawSubmission, ValidationFailure};

use crate::error::ServerError;
use crate::state::ServerState;

/// Response body for an accepted testimony.
///
/// Field names follow the public form contract, which predates this
/// server and calls stored documents "issues".
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestimonyResponse {
    pub success: bool,
    pub issue_url: String,
    pub issue_number: u64,
    pub media_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_warning: Option<String>,
}

/// Handle POST /submit-testimony
///
/// Runs the full pipeline. Validation failures answer 400 with the
/// localized per-field messages; a spam-trap hit answers the same
/// generic success as a real submission.
pub async fn submit_testimony<B: DocumentBackend + 'static>(
    State(state): State<Arc<ServerState<B>>>,
    Json(raw): Json<RawSubmission>,
) -> Result<Response, ServerError> {
    counter!("submissions_total").increment(1);

    let outcome = match romeria::submit_testimony(&state.pipeline, raw).await {
        Ok(outcome) => outcome,
        Err(err) if err.is_client_error() => return Ok(validation_response(&err)),
        Err(err) => return Err(err.into()),
    };

    if outcome.honeypot_discarded {
        return Ok((StatusCode::CREATED, Json(json!({ "success": true }))).into_response());
    }

    if outcome.image_warning.is_some() {
        counter!("uploads_failed_total").increment(1);
    }
    if outcome.created {
        counter!("documents_created_total").increment(1);
    } else {
        counter!("duplicates_total").increment(1);
    }

    let body = SubmitTestimonyResponse {
        success: true,
        issue_url: outcome.document_url,
        issue_number: outcome.document_number,
        media_urls: outcome.media_urls,
        image_warning: outcome.image_warning,
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

fn validation_response(err: &PipelineError) -> Response {
    let message = match err {
        PipelineError::Validation(failure) => field_error_message(failure),
        other => other.to_string(),
    };
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}

fn field_error_message(failure: &ValidationFailure) -> String {
    match failure.field_errors() {
        Some(errors) => errors.values().cloned().collect::<Vec<_>>().join(", "),
        None => failure.to_string(),
    }
}

/// Query parameters for GET /testimonials.
#[derive(Debug, Deserialize)]
pub struct TestimonialsQuery {
    /// Exact destination filter.
    pub destination: Option<String>,
    /// Case-insensitive substring search.
    pub search: Option<String>,
    /// 1-based page of the filtered feed.
    pub page: Option<usize>,
    /// `verified` or `review` for the unpaged moderation views.
    pub mode: Option<String>,
}

/// Handle GET /testimonials
///
/// Default mode answers the filtered, paginated public feed. The
/// `verified` and `review` modes answer the visibility split without
/// pagination.
pub async fn list_testimonials<B: DocumentBackend + 'static>(
    State(state): State<Arc<ServerState<B>>>,
    Query(query): Query<TestimonialsQuery>,
) -> Result<Response, ServerError> {
    let _guard = state.display_guard.lock().await;
    state.display.load(false).await?;

    match query.mode.as_deref() {
        None => {}
        Some("verified") => {
            let records = state.display.verified_testimonials()?;
            return Ok(Json(json!({ "success": true, "testimonials": records })).into_response());
        }
        Some("review") => {
            let records = state.display.testimonials_for_review()?;
            return Ok(Json(json!({ "success": true, "testimonials": records })).into_response());
        }
        Some(other) => {
            return Err(ServerError::BadRequest(format!("unknown mode: {other}")));
        }
    }

    state
        .display
        .apply_filters(query.destination.as_deref(), query.search.as_deref())?;

    let page = query.page.unwrap_or(1).max(1);
    for _ in 1..page {
        if !state.display.load_more()? {
            break;
        }
    }

    let records = state.display.visible()?;
    let info = state.display.page_info()?;
    Ok(Json(json!({ "success": true, "testimonials": records, "page": info })).into_response())
}
