//! Lead client error types.

use thiserror::Error;

/// Errors from writing a lead to the document database.
///
/// `client_message` maps each variant to the fixed strings the API
/// returns; raw provider detail is logged server-side only.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeadError {
    /// Credentials or settings are missing; no request was made.
    #[error("lead configuration error: {0}")]
    Config(String),

    /// The database rejected the property payload.
    #[error("lead database validation error: {detail}")]
    Validation { detail: String },

    /// The token was rejected or lacks access to the database.
    #[error("lead database auth failure (status {status})")]
    Auth { status: u16 },

    /// The configured database does not exist or is not shared.
    #[error("lead database not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("lead database error (status {status}): {detail}")]
    Api { status: u16, detail: String },

    /// A 2xx response that did not parse as expected.
    #[error("unexpected lead database response: {0}")]
    InvalidResponse(String),

    /// The request never completed.
    #[error("lead request transport failure: {0}")]
    Transport(String),
}

impl LeadError {
    /// The generic message safe to put in a client response body.
    pub fn client_message(&self) -> &'static str {
        match self {
            LeadError::Config(_) => "Server configuration error",
            LeadError::Validation { .. } => {
                "Database validation error - check property names match"
            }
            LeadError::Auth { .. } => {
                "Notion API key invalid or integration not connected to database"
            }
            LeadError::NotFound(_) => "Notion database not found - check database ID",
            _ => "Failed to save lead",
        }
    }

    /// Suggested HTTP status for API layers.
    pub fn http_status_code(&self) -> u16 {
        500
    }
}
