//! Lead-form intake endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use serde_json::json;

use leads::{validate_lead, RawLead};
use store::DocumentBackend;
use submission::ValidationFailure;

use crate::error::ServerError;
use crate::state::ServerState;

/// Handle POST /contact-lead
///
/// Unlike the testimony endpoint, a spam-trap hit here answers a plain
/// 400; the reference form never promised bots a success.
pub async fn contact_lead<B: DocumentBackend + 'static>(
    State(state): State<Arc<ServerState<B>>>,
    Json(raw): Json<RawLead>,
) -> Result<Response, ServerError> {
    let lead = match validate_lead(raw) {
        Ok(lead) => lead,
        Err(ValidationFailure::Honeypot) => return Ok(bad_request("Invalid submission")),
        Err(failure) => {
            let message = failure
                .field_errors()
                .map(|errors| errors.values().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_else(|| failure.to_string());
            return Ok(bad_request(&message));
        }
    };

    let outcome = state.lead_client.submit(&lead).await?;
    counter!("leads_total").increment(1);
    Ok(Json(json!({ "success": true, "id": outcome.id })).into_response())
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}
