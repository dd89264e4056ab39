//! Error types produced by the upload client.

use thiserror::Error;

/// Reasons an upload failed.
///
/// Provider and transport failures carry sanitized detail only. The raw
/// provider body may contain account identifiers, so callers log the
/// extracted message rather than the response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadError {
    /// The client was constructed without validating its configuration.
    #[error("upload configuration invalid: {0}")]
    Config(String),

    /// The attachment declared a MIME type outside the accepted set.
    #[error("unsupported media type: {mime}")]
    UnsupportedMediaType {
        /// The declared MIME type.
        mime: String,
    },

    /// The provider answered with a non-success status.
    #[error("provider rejected upload ({status}): {detail}")]
    Provider {
        /// HTTP status from the provider.
        status: u16,
        /// Message extracted from the provider's error body.
        detail: String,
    },

    /// The provider answered 2xx but the body was not the expected shape.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),

    /// The request never completed.
    #[error("upload transport failure: {0}")]
    Transport(String),
}

impl UploadError {
    /// Returns true when the failure is attributable to the submitted file
    /// rather than the provider or network.
    pub fn is_client_error(&self) -> bool {
        matches!(self, UploadError::UnsupportedMediaType { .. })
    }

    /// Suggested HTTP status for surfacing this failure.
    pub fn http_status_code(&self) -> u16 {
        match self {
            UploadError::UnsupportedMediaType { .. } => 400,
            UploadError::Provider { .. }
            | UploadError::InvalidResponse(_)
            | UploadError::Transport(_)
            | UploadError::Config(_) => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let bad_type = UploadError::UnsupportedMediaType {
            mime: "application/pdf".into(),
        };
        assert!(bad_type.is_client_error());
        assert_eq!(bad_type.http_status_code(), 400);

        let provider = UploadError::Provider {
            status: 401,
            detail: "Invalid signature".into(),
        };
        assert!(!provider.is_client_error());
        assert_eq!(provider.http_status_code(), 502);
    }
}
