//! Error types produced by the store client.

use thiserror::Error;

/// Reasons a store operation failed.
///
/// Store failures are never silently dropped. A create that cannot
/// complete, including after the assignee fallback, surfaces here and the
/// endpoint reports a server error to the submitter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The client was invoked with an invalid configuration.
    #[error("store configuration invalid: {0}")]
    Config(String),

    /// The store rejected the payload as invalid (422-style).
    ///
    /// The create path retries once without assignees before surfacing
    /// this variant.
    #[error("store rejected payload: {detail}")]
    Validation {
        /// Message extracted from the store's error body.
        detail: String,
    },

    /// The token was missing, expired, or lacks access (401/403).
    #[error("store authorization failed ({status})")]
    Auth {
        /// HTTP status from the store.
        status: u16,
    },

    /// Any other non-success response.
    #[error("store API error ({status}): {detail}")]
    Api {
        /// HTTP status from the store.
        status: u16,
        /// Message extracted from the store's error body.
        detail: String,
    },

    /// The store answered but the body was not the expected shape.
    #[error("unexpected store response: {0}")]
    InvalidResponse(String),

    /// The request never completed.
    #[error("store transport failure: {0}")]
    Transport(String),
}

impl StoreError {
    /// Store failures are infrastructure problems, never the submitter's
    /// fault, so this always returns false.
    pub fn is_client_error(&self) -> bool {
        false
    }

    /// Suggested HTTP status for surfacing this failure.
    pub fn http_status_code(&self) -> u16 {
        502
    }
}
