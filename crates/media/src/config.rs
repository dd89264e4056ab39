//! Configuration for the Cloudinary upload client.
//!
//! Credentials come from the service environment and must never appear in
//! client-facing responses or logs. [`MediaConfig::validate`] runs at
//! start-up so a missing secret is caught before the first upload.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection and policy settings for media uploads.
///
/// # Fields
///
/// | Field | Purpose |
/// |-------|---------|
/// | `cloud_name` | Cloudinary cloud identifier, part of the upload URL |
/// | `api_key` | Public API key sent with each signed upload |
/// | `api_secret` | Secret used to sign upload parameters |
/// | `upload_preset` | Optional unsigned preset; when set, signing is skipped |
/// | `folder` | Destination folder for all testimony media |
/// | `timeout_secs` | Per-request timeout in seconds |
/// | `fail_on_upload_error` | Abort the batch on first failure instead of continuing |
/// | `api_base` | Upload API base URL, overridable for tests |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MediaConfig {
    /// Cloudinary cloud name.
    pub cloud_name: String,

    /// Cloudinary API key.
    pub api_key: String,

    /// Cloudinary API secret. Never logged.
    pub api_secret: String,

    /// Unsigned upload preset. When present, uploads send the preset name
    /// instead of a signature and the key/secret are not required.
    pub upload_preset: Option<String>,

    /// Folder the testimony media lands in.
    pub folder: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// When true, a failed upload aborts the whole submission. When false,
    /// the pipeline records the failure and publishes without that file.
    pub fail_on_upload_error: bool,

    /// Base URL of the upload API.
    pub api_base: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            upload_preset: None,
            folder: "romeria-testimonies".to_string(),
            timeout_secs: 30,
            fail_on_upload_error: false,
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
        }
    }
}

impl MediaConfig {
    /// Returns true when uploads use an unsigned preset.
    pub fn is_unsigned(&self) -> bool {
        self.upload_preset
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }

    /// Validates that the configuration can produce authorized uploads.
    ///
    /// Signed mode needs cloud name, key, and secret. Unsigned mode needs
    /// cloud name and a preset.
    ///
    /// # Example
    ///
    /// ```rust
    /// use media::MediaConfig;
    ///
    /// let cfg = MediaConfig {
    ///     cloud_name: "demo".into(),
    ///     api_key: "key".into(),
    ///     api_secret: "secret".into(),
    ///     ..Default::default()
    /// };
    /// assert!(cfg.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), MediaConfigError> {
        if self.cloud_name.trim().is_empty() {
            return Err(MediaConfigError::MissingCloudName);
        }
        if !self.is_unsigned() {
            if self.api_key.trim().is_empty() {
                return Err(MediaConfigError::MissingCredential { field: "api_key" });
            }
            if self.api_secret.trim().is_empty() {
                return Err(MediaConfigError::MissingCredential {
                    field: "api_secret",
                });
            }
        }
        if self.folder.trim().is_empty() {
            return Err(MediaConfigError::MissingFolder);
        }
        if self.timeout_secs == 0 {
            return Err(MediaConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Builds the upload endpoint for a resource type.
    pub(crate) fn upload_url(&self, resource_type: &str) -> String {
        format!(
            "{}/{}/{}/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name,
            resource_type
        )
    }
}

/// Errors raised by [`MediaConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaConfigError {
    /// No cloud name configured.
    #[error("cloud_name is required")]
    MissingCloudName,

    /// A signed-mode credential is missing.
    #[error("{field} is required for signed uploads")]
    MissingCredential {
        /// The missing credential field.
        field: &'static str,
    },

    /// No destination folder configured.
    #[error("folder must not be empty")]
    MissingFolder,

    /// Timeout of zero would fail every request.
    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
}
