//! Error types produced by the submission validator.
//!
//! This module defines the error surface for testimony validation. All
//! errors are typed, cloneable, and comparable to enable precise handling
//! and testing.
//!
//! # Error Categories
//!
//! | Error | Category | Description |
//! |-------|----------|-------------|
//! | [`Honeypot`](ValidationFailure::Honeypot) | Spam | Hidden trap field was filled in |
//! | [`Invalid`](ValidationFailure::Invalid) | Validation | One or more fields failed a rule |
//!
//! The two variants call for very different handling: a field failure is
//! reported back to the user with localized messages, while a honeypot hit
//! must be answered with a generic success so automated abuse gets no
//! signal that it was detected.
//!
//! # Examples
//!
//! ```rust
//! use submission::ValidationFailure;
//! use std::collections::BTreeMap;
//!
//! fn first_message(failure: &ValidationFailure) -> Option<&str> {
//!     match failure {
//!         ValidationFailure::Honeypot => None,
//!         ValidationFailure::Invalid { errors } => {
//!             errors.values().next().map(String::as_str)
//!         }
//!         _ => None,
//!     }
//! }
//!
//! let mut errors = BTreeMap::new();
//! errors.insert("name".to_string(), "Name is required".to_string());
//! let failure = ValidationFailure::Invalid { errors };
//! assert_eq!(first_message(&failure), Some("Name is required"));
//! ```
use std::collections::BTreeMap;

use thiserror::Error;

/// Reasons a raw submission was rejected by the validator.
///
/// All variants are:
///
/// - **Cloneable**: Can be copied for error propagation
/// - **Comparable**: Support equality checks for testing
/// - **Displayable**: Implement `std::fmt::Display` for log messages
///
/// The enum is marked `#[non_exhaustive]` to allow future additions
/// without breaking existing code. Callers should always include a
/// catch-all arm when matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationFailure {
    /// The hidden spam-trap field carried content.
    ///
    /// Handlers must not echo this condition to the client. The endpoint
    /// responds with a generic success while skipping all CDN and store
    /// calls, so bots cannot distinguish a trapped submission from a real
    /// one.
    #[error("submission discarded by spam trap")]
    Honeypot,

    /// One or more fields failed validation.
    ///
    /// The map is keyed by field name (`name`, `trip`, `testimony`,
    /// `email`, `language`, `consent`, `media[0]`, ...) with messages
    /// already localized to the submission language. A `BTreeMap` keeps
    /// field order stable in responses and logs.
    ///
    /// # Example
    ///
    /// ```rust
    /// use submission::ValidationFailure;
    /// use std::collections::BTreeMap;
    ///
    /// let mut errors = BTreeMap::new();
    /// errors.insert("consent".to_string(), "Consent is required".to_string());
    /// let failure = ValidationFailure::Invalid { errors };
    /// assert!(failure.to_string().contains("1 field"));
    /// ```
    #[error("invalid submission: {} field(s) failed validation", errors.len())]
    Invalid {
        /// Per-field localized error messages.
        errors: BTreeMap<String, String>,
    },
}

impl ValidationFailure {
    /// Returns true if this failure indicates a client-side issue.
    ///
    /// All validation failures are client-side, so this always returns
    /// true. Provided for API consistency with downstream error types
    /// that have server-side variants.
    pub fn is_client_error(&self) -> bool {
        true
    }

    /// Returns a suggested HTTP status code for this failure.
    ///
    /// Note that [`Honeypot`](ValidationFailure::Honeypot) maps to 400
    /// here for completeness, but the testimony endpoint deliberately
    /// ignores this and answers 201 instead.
    pub fn http_status_code(&self) -> u16 {
        400
    }

    /// Returns the per-field error map, if this is a field failure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use submission::ValidationFailure;
    ///
    /// assert!(ValidationFailure::Honeypot.field_errors().is_none());
    /// ```
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ValidationFailure::Invalid { errors } => Some(errors),
            _ => None,
        }
    }
}
