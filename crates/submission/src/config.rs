//! Configuration for the submission validator.
//!
//! [`SubmissionConfig`] controls sanitization behavior, field length bounds,
//! the accepted media formats, and per-kind size caps. The defaults match
//! the public testimony form; services load overrides from the pipeline
//! configuration file.
//!
//! # Example
//!
//! ```rust
//! use submission::SubmissionConfig;
//!
//! let config = SubmissionConfig {
//!     narrative_min_chars: 20,
//!     ..Default::default()
//! };
//!
//! assert!(config.validate().is_ok());
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::MediaKind;

/// Tunable policy for validating and sanitizing testimony submissions.
///
/// # Fields
///
/// | Field | Purpose |
/// |-------|---------|
/// | `strip_control_chars` | Remove control characters from free text before checks |
/// | `name_min_chars` / `name_max_chars` | Name length bounds, counted in characters |
/// | `trip_min_chars` / `trip_max_chars` | Trip description bounds |
/// | `narrative_min_chars` / `narrative_max_chars` | Testimony narrative bounds |
/// | `require_consent` | Whether the consent checkbox must be true |
/// | `allowed_mime_types` | Exact MIME types accepted for attachments |
/// | `max_image_bytes` / `max_video_bytes` / `max_audio_bytes` | Per-kind size caps |
/// | `submission_id_namespace` | UUIDv5 namespace for deterministic submission ids |
///
/// All length bounds count Unicode scalar values, not bytes, so accented
/// Spanish text is measured the way the form counts it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Config format version, for forward compatibility.
    pub version: u32,

    /// Strip ASCII control characters from free-text fields before any
    /// length or pattern check.
    pub strip_control_chars: bool,

    /// Minimum name length in characters.
    pub name_min_chars: usize,
    /// Maximum name length in characters.
    pub name_max_chars: usize,

    /// Minimum trip description length in characters.
    pub trip_min_chars: usize,
    /// Maximum trip description length in characters.
    pub trip_max_chars: usize,

    /// Minimum narrative length in characters.
    pub narrative_min_chars: usize,
    /// Maximum narrative length in characters.
    pub narrative_max_chars: usize,

    /// Reject submissions whose consent checkbox is absent or false.
    pub require_consent: bool,

    /// Exact MIME types accepted for media attachments.
    pub allowed_mime_types: Vec<String>,

    /// Size cap for image attachments, in bytes.
    pub max_image_bytes: u64,
    /// Size cap for video attachments, in bytes.
    pub max_video_bytes: u64,
    /// Size cap for audio attachments, in bytes.
    pub max_audio_bytes: u64,

    /// Namespace for deriving deterministic submission ids via UUIDv5.
    pub submission_id_namespace: Uuid,
}

impl Default for SubmissionConfig {
    /// Defaults mirror the public form contract.
    ///
    /// - name: 2 to 100 characters
    /// - trip: 5 to 200 characters
    /// - narrative: 50 to 2000 characters
    /// - consent required
    /// - images up to 10 MB, video up to 150 MB, audio up to 50 MB
    ///
    /// # Example
    ///
    /// ```rust
    /// use submission::SubmissionConfig;
    ///
    /// let config = SubmissionConfig::default();
    /// assert_eq!(config.narrative_min_chars, 50);
    /// assert_eq!(config.max_image_bytes, 10 * 1024 * 1024);
    /// assert!(config.require_consent);
    /// ```
    fn default() -> Self {
        Self {
            version: 1,
            strip_control_chars: true,
            name_min_chars: 2,
            name_max_chars: 100,
            trip_min_chars: 5,
            trip_max_chars: 200,
            narrative_min_chars: 50,
            narrative_max_chars: 2000,
            require_consent: true,
            allowed_mime_types: default_allowed_mime_types(),
            max_image_bytes: 10 * 1024 * 1024,
            max_video_bytes: 150 * 1024 * 1024,
            max_audio_bytes: 50 * 1024 * 1024,
            submission_id_namespace: Uuid::NAMESPACE_OID,
        }
    }
}

fn default_allowed_mime_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/gif",
        "image/webp",
        "video/mp4",
        "video/webm",
        "audio/mpeg",
        "audio/mp3",
        "audio/wav",
        "audio/ogg",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl SubmissionConfig {
    /// Returns the configured size cap for a media kind, in bytes.
    pub fn size_cap(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Image => self.max_image_bytes,
            MediaKind::Video => self.max_video_bytes,
            MediaKind::Audio => self.max_audio_bytes,
        }
    }

    /// Returns true if the exact MIME type is accepted for attachments.
    ///
    /// Comparison is case-insensitive on the submitted value; the
    /// configured list is expected to be lowercase.
    pub fn accepts_mime(&self, mime: &str) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        self.allowed_mime_types.iter().any(|m| m == &mime)
    }

    /// Validates internal consistency of this configuration.
    ///
    /// Intended to run at service start-up so misconfiguration surfaces
    /// before live traffic. Checks are in-memory only.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use submission::SubmissionConfig;
    ///
    /// assert!(SubmissionConfig::default().validate().is_ok());
    ///
    /// let inverted = SubmissionConfig {
    ///     name_min_chars: 200,
    ///     name_max_chars: 100,
    ///     ..Default::default()
    /// };
    /// assert!(inverted.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, min, max) in [
            ("name", self.name_min_chars, self.name_max_chars),
            ("trip", self.trip_min_chars, self.trip_max_chars),
            (
                "narrative",
                self.narrative_min_chars,
                self.narrative_max_chars,
            ),
        ] {
            if min == 0 {
                return Err(ConfigError::ZeroMinimum { field });
            }
            if min > max {
                return Err(ConfigError::BoundsInverted { field, min, max });
            }
        }

        for (kind, cap) in [
            ("image", self.max_image_bytes),
            ("video", self.max_video_bytes),
            ("audio", self.max_audio_bytes),
        ] {
            if cap == 0 {
                return Err(ConfigError::ZeroMediaCap { kind });
            }
        }

        if self.allowed_mime_types.is_empty() {
            return Err(ConfigError::NoAllowedMimeTypes);
        }

        Ok(())
    }
}

/// Errors that can occur when validating a [`SubmissionConfig`].
///
/// These are configuration-time issues, surfaced at service start-up
/// rather than per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A field's minimum length exceeds its maximum.
    #[error("{field} length bounds inverted: minimum ({min}) exceeds maximum ({max})")]
    BoundsInverted {
        /// The misconfigured field.
        field: &'static str,
        /// Configured minimum length, in characters.
        min: usize,
        /// Configured maximum length, in characters.
        max: usize,
    },

    /// A field's minimum length is zero, which would admit empty values
    /// the required-field check is supposed to reject.
    #[error("{field} minimum length must be at least 1")]
    ZeroMinimum {
        /// The misconfigured field.
        field: &'static str,
    },

    /// A media size cap is zero, which would reject every attachment of
    /// that kind.
    #[error("size cap for {kind} media must be greater than zero")]
    ZeroMediaCap {
        /// The media kind with the zero cap.
        kind: &'static str,
    },

    /// The accepted MIME type list is empty.
    #[error("allowed_mime_types must not be empty")]
    NoAllowedMimeTypes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SubmissionConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_bounds_rejected() {
        let cfg = SubmissionConfig {
            trip_min_chars: 300,
            trip_max_chars: 200,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::BoundsInverted {
                field: "trip",
                min: 300,
                max: 200
            })
        );
    }

    #[test]
    fn zero_minimum_rejected() {
        let cfg = SubmissionConfig {
            name_min_chars: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroMinimum { field: "name" })
        ));
    }

    #[test]
    fn zero_media_cap_rejected() {
        let cfg = SubmissionConfig {
            max_audio_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroMediaCap { kind: "audio" })
        ));
    }

    #[test]
    fn empty_mime_list_rejected() {
        let cfg = SubmissionConfig {
            allowed_mime_types: vec![],
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoAllowedMimeTypes));
    }

    #[test]
    fn size_cap_routing() {
        let cfg = SubmissionConfig::default();
        assert_eq!(cfg.size_cap(MediaKind::Image), 10 * 1024 * 1024);
        assert_eq!(cfg.size_cap(MediaKind::Video), 150 * 1024 * 1024);
        assert_eq!(cfg.size_cap(MediaKind::Audio), 50 * 1024 * 1024);
    }

    #[test]
    fn mime_acceptance_is_case_insensitive() {
        let cfg = SubmissionConfig::default();
        assert!(cfg.accepts_mime("IMAGE/JPEG"));
        assert!(cfg.accepts_mime(" video/mp4 "));
        assert!(!cfg.accepts_mime("application/pdf"));
    }
}
