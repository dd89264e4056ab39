//! Lead database configuration.

use thiserror::Error;

/// Settings for the lead database client.
///
/// | Field | Meaning | Default |
/// |-------|---------|---------|
/// | `api_key` | Integration token, required for writes | `None` |
/// | `database_id` | Target database, required for writes | `None` |
/// | `api_base` | API origin | `https://api.notion.com` |
/// | `api_version` | Versioned-header value | `2022-06-28` |
/// | `timeout_secs` | Per-request timeout | `15` |
#[derive(Debug, Clone)]
pub struct LeadConfig {
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub api_base: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for LeadConfig {
    fn default() -> Self {
        LeadConfig {
            api_key: None,
            database_id: None,
            api_base: "https://api.notion.com".to_string(),
            api_version: "2022-06-28".to_string(),
            timeout_secs: 15,
        }
    }
}

impl LeadConfig {
    /// The pages endpoint writes go to.
    pub fn pages_url(&self) -> String {
        format!("{}/v1/pages", self.api_base.trim_end_matches('/'))
    }

    /// Checks that a write could succeed with this configuration.
    ///
    /// Detail stays server-side; clients see a generic configuration
    /// error.
    pub fn validate(&self) -> Result<(), LeadConfigError> {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(LeadConfigError::MissingCredential { field: "api_key" });
        }
        if self
            .database_id
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
        {
            return Err(LeadConfigError::MissingCredential {
                field: "database_id",
            });
        }
        if self.timeout_secs == 0 {
            return Err(LeadConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Configuration problems detected before any request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LeadConfigError {
    #[error("lead database credential `{field}` is not configured")]
    MissingCredential { field: &'static str },

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> LeadConfig {
        LeadConfig {
            api_key: Some("secret_test".into()),
            database_id: Some("a".repeat(32)),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_not_writable() {
        assert_eq!(
            LeadConfig::default().validate(),
            Err(LeadConfigError::MissingCredential { field: "api_key" })
        );
    }

    #[test]
    fn blank_credentials_do_not_count() {
        let cfg = LeadConfig {
            api_key: Some("  ".into()),
            ..configured()
        };
        assert!(matches!(
            cfg.validate(),
            Err(LeadConfigError::MissingCredential { field: "api_key" })
        ));
    }

    #[test]
    fn configured_instance_validates() {
        assert_eq!(configured().validate(), Ok(()));
    }

    #[test]
    fn pages_url_tolerates_trailing_slash() {
        let cfg = LeadConfig {
            api_base: "https://api.notion.com/".into(),
            ..configured()
        };
        assert_eq!(cfg.pages_url(), "https://api.notion.com/v1/pages");
    }
}
