//! Display-side error types.

use thiserror::Error;

/// Errors from the display controller.
///
/// A `Fetch` error only surfaces when there is no last-good snapshot to
/// fall back to; with a stale snapshot the controller serves it and logs
/// instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DisplayError {
    /// The backing store could not be read and no snapshot exists.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Internal controller state was unusable.
    #[error("display state error: {0}")]
    State(String),
}

impl DisplayError {
    /// Suggested HTTP status for API layers.
    pub fn http_status_code(&self) -> u16 {
        match self {
            DisplayError::Fetch(_) => 502,
            DisplayError::State(_) => 500,
        }
    }
}
