//! Configuration for the document store client.
//!
//! The token comes from the service environment and is required for
//! writes. Reads work without it, subject to the store's anonymous rate
//! limits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Connection and policy settings for the store client.
///
/// # Fields
///
/// | Field | Purpose |
/// |-------|---------|
/// | `owner` / `repo` | Repository the testimony documents live in |
/// | `token` | API token; required for writes, optional for reads |
/// | `label` | Label that marks testimony documents |
/// | `assignees` | Default reviewers attached to new documents |
/// | `dry_run` | Encode and log but skip the store write |
/// | `timeout_secs` | Per-request timeout in seconds |
/// | `api_base` | REST API base URL, overridable for tests |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Repository owner.
    pub owner: String,

    /// Repository name.
    pub repo: String,

    /// API token. Never logged.
    pub token: Option<String>,

    /// Label that marks testimony documents.
    pub label: String,

    /// Reviewers assigned to new documents. Dropped on a validation
    /// rejection rather than failing the create.
    pub assignees: Vec<String>,

    /// Skip the store write and return a synthetic outcome.
    pub dry_run: bool,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// REST API base URL.
    pub api_base: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            token: None,
            label: "testimony".to_string(),
            assignees: vec![
                "andercastellanos".to_string(),
                "jandrearuiz".to_string(),
            ],
            dry_run: false,
            timeout_secs: 15,
            api_base: "https://api.github.com".to_string(),
        }
    }
}

impl StoreConfig {
    /// Returns the token if one is configured and non-blank.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Validates the configuration for read access.
    pub fn validate(&self) -> Result<(), StoreConfigError> {
        if self.owner.trim().is_empty() {
            return Err(StoreConfigError::MissingField { field: "owner" });
        }
        if self.repo.trim().is_empty() {
            return Err(StoreConfigError::MissingField { field: "repo" });
        }
        if self.label.trim().is_empty() {
            return Err(StoreConfigError::MissingField { field: "label" });
        }
        if self.timeout_secs == 0 {
            return Err(StoreConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Validates the configuration for writes, which additionally need a
    /// token unless dry-run is on.
    pub fn validate_for_write(&self) -> Result<(), StoreConfigError> {
        self.validate()?;
        if !self.dry_run && self.token().is_none() {
            return Err(StoreConfigError::MissingToken);
        }
        Ok(())
    }

    /// Issues collection URL for this repository.
    pub(crate) fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

/// Errors raised by [`StoreConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreConfigError {
    /// A required field is empty.
    #[error("{field} is required")]
    MissingField {
        /// The missing field.
        field: &'static str,
    },

    /// Writes need a token when dry-run is off.
    #[error("an API token is required to create documents")]
    MissingToken,

    /// Timeout of zero would fail every request.
    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_config() -> StoreConfig {
        StoreConfig {
            owner: "romeria-travel".into(),
            repo: "testimonies".into(),
            ..Default::default()
        }
    }

    #[test]
    fn read_config_needs_no_token() {
        assert!(read_config().validate().is_ok());
    }

    #[test]
    fn write_config_needs_token() {
        assert_eq!(
            read_config().validate_for_write(),
            Err(StoreConfigError::MissingToken)
        );
        let with_token = StoreConfig {
            token: Some("ghp_test".into()),
            ..read_config()
        };
        assert!(with_token.validate_for_write().is_ok());
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let cfg = StoreConfig {
            token: Some("   ".into()),
            ..read_config()
        };
        assert_eq!(cfg.token(), None);
        assert_eq!(
            cfg.validate_for_write(),
            Err(StoreConfigError::MissingToken)
        );
    }

    #[test]
    fn dry_run_skips_token_requirement() {
        let cfg = StoreConfig {
            dry_run: true,
            ..read_config()
        };
        assert!(cfg.validate_for_write().is_ok());
    }

    #[test]
    fn missing_repo_rejected() {
        let cfg = StoreConfig {
            repo: String::new(),
            ..read_config()
        };
        assert_eq!(
            cfg.validate(),
            Err(StoreConfigError::MissingField { field: "repo" })
        );
    }

    #[test]
    fn issues_url_shape() {
        assert_eq!(
            read_config().issues_url(),
            "https://api.github.com/repos/romeria-travel/testimonies/issues"
        );
    }
}
