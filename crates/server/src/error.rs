use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// Response bodies carry a fixed, generic message per error class.
/// Provider detail (store status lines, CDN errors, lead database
/// responses) stays in the server logs.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Request timeout")]
    Timeout,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: max {0}MB allowed")]
    PayloadTooLarge(usize),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] romeria::PipelineError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Display error: {0}")]
    Display(#[from] display::DisplayError),

    #[error("Lead error: {0}")]
    Lead(#[from] leads::LeadError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Pipeline(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) | ServerError::Store(_) => StatusCode::BAD_GATEWAY,
            ServerError::Display(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Lead(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::Timeout => "REQUEST_TIMEOUT",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::Pipeline(err) if err.is_client_error() => "VALIDATION_ERROR",
            ServerError::Pipeline(_) => "PIPELINE_ERROR",
            ServerError::Store(_) => "STORE_ERROR",
            ServerError::Display(_) => "DISPLAY_ERROR",
            ServerError::Lead(_) => "LEAD_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }

    /// The message safe to put in a response body.
    fn public_message(&self) -> String {
        match self {
            ServerError::Pipeline(err) if err.is_client_error() => err.to_string(),
            ServerError::Pipeline(_) => "Failed to save testimony".to_string(),
            ServerError::Store(_) | ServerError::Display(_) => {
                "Failed to load testimonials".to_string()
            }
            ServerError::Lead(err) => err.client_message().to_string(),
            ServerError::Internal(_) | ServerError::Config(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, code = self.error_code(), "request_error");
        }

        let body = Json(json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": self.public_message(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
