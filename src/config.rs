//! YAML configuration for the testimony pipeline.
//!
//! One file configures every stage (submission, media, store, parser,
//! display, lead). Stage sections are optional; a missing section takes
//! the stage defaults, so a minimal file only names what it overrides.
//!
//! Secrets never live in the file. [`PipelineConfig::overlay_env`] fills
//! the CDN key/secret, store token, and lead database credentials from
//! the process environment after the file is parsed.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # Romeria pipeline configuration
//! version: "1.0"
//!
//! submission:
//!   narrative_min_chars: 50
//!   narrative_max_chars: 2000
//!
//! media:
//!   folder: "romeria-testimonies"
//!   fail_on_upload_error: false
//!
//! store:
//!   owner: "romeria-travel"
//!   repo: "testimonies"
//!   label: "testimony"
//!
//! parser:
//!   verified_label: "verified"
//!
//! display:
//!   cache_ttl_secs: 300
//!   page_size: 9
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use display::DisplayConfig;
use leads::LeadConfig;
use media::MediaConfig;
use parser::{ParserConfig, DEFAULT_ALLOWED_HOSTS};
use store::StoreConfig;
use submission::SubmissionConfig;

/// Errors that can occur when loading YAML configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline.
///
/// Credential presence is not checked here; the write paths validate
/// their own credentials at call time so a read-only deployment can run
/// from a file with none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Submission validation rules.
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// CDN upload client settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Document store client settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Document parser settings.
    #[serde(default)]
    pub parser: ParserYamlConfig,

    /// Display controller settings.
    #[serde(default)]
    pub display: DisplayYamlConfig,

    /// Lead database client settings.
    #[serde(default)]
    pub lead: LeadYamlConfig,
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Runs automatically on load; callers that mutate the config
    /// afterwards (environment overlays) can re-check it here.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.submission
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;
        self.parser.validate()?;
        self.display.validate()?;
        self.lead.validate()?;

        if self.media.timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "media.timeout_secs must be >= 1".to_string(),
            ));
        }
        if self.store.timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "store.timeout_secs must be >= 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Fill secrets and deployment coordinates from the process
    /// environment.
    ///
    /// | Variable | Target |
    /// |----------|--------|
    /// | `CLOUDINARY_CLOUD_NAME` | `media.cloud_name` |
    /// | `CLOUDINARY_API_KEY` | `media.api_key` |
    /// | `CLOUDINARY_API_SECRET` | `media.api_secret` |
    /// | `CLOUDINARY_UPLOAD_PRESET` | `media.upload_preset` |
    /// | `GITHUB_TOKEN` | `store.token` |
    /// | `GITHUB_REPO` (`owner/repo`) | `store.owner` + `store.repo` |
    /// | `NOTION_API_KEY` | `lead.api_key` |
    /// | `NOTION_DATABASE_ID` | `lead.database_id` |
    pub fn overlay_env(&mut self) {
        self.overlay_env_with(|key| std::env::var(key).ok());
    }

    /// Same as [`overlay_env`](Self::overlay_env) with an injectable
    /// lookup, so tests never mutate the process environment.
    pub fn overlay_env_with<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = get("CLOUDINARY_CLOUD_NAME") {
            self.media.cloud_name = value;
        }
        if let Some(value) = get("CLOUDINARY_API_KEY") {
            self.media.api_key = value;
        }
        if let Some(value) = get("CLOUDINARY_API_SECRET") {
            self.media.api_secret = value;
        }
        if let Some(value) = get("CLOUDINARY_UPLOAD_PRESET") {
            self.media.upload_preset = Some(value);
        }
        if let Some(value) = get("GITHUB_TOKEN") {
            self.store.token = Some(value);
        }
        if let Some(value) = get("GITHUB_REPO") {
            if let Some((owner, repo)) = value.split_once('/') {
                self.store.owner = owner.to_string();
                self.store.repo = repo.to_string();
            }
        }
        if let Some(value) = get("NOTION_API_KEY") {
            self.lead.api_key = Some(value);
        }
        if let Some(value) = get("NOTION_DATABASE_ID") {
            self.lead.database_id = Some(value);
        }
    }

    /// The parser settings as the parser crate consumes them.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            allowed_media_hosts: self.parser.allowed_media_hosts.clone(),
            verified_label: self.parser.verified_label.clone(),
            needs_review_label: self.parser.needs_review_label.clone(),
        }
    }

    /// The display settings as the display crate consumes them.
    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            cache_ttl_secs: self.display.cache_ttl_secs,
            page_size: self.display.page_size,
        }
    }

    /// The lead settings as the leads crate consumes them.
    pub fn lead_config(&self) -> LeadConfig {
        LeadConfig {
            api_key: self.lead.api_key.clone(),
            database_id: self.lead.database_id.clone(),
            api_base: self.lead.api_base.clone(),
            api_version: self.lead.api_version.clone(),
            timeout_secs: self.lead.timeout_secs,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            submission: SubmissionConfig::default(),
            media: MediaConfig::default(),
            store: StoreConfig::default(),
            parser: ParserYamlConfig::default(),
            display: DisplayYamlConfig::default(),
            lead: LeadYamlConfig::default(),
        }
    }
}

/// Parser stage YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserYamlConfig {
    #[serde(default = "default_allowed_hosts")]
    pub allowed_media_hosts: Vec<String>,

    #[serde(default = "default_verified_label")]
    pub verified_label: String,

    #[serde(default = "default_needs_review_label")]
    pub needs_review_label: String,
}

impl ParserYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.verified_label.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "parser.verified_label must not be empty".to_string(),
            ));
        }
        if self.needs_review_label.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "parser.needs_review_label must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ParserYamlConfig {
    fn default() -> Self {
        Self {
            allowed_media_hosts: default_allowed_hosts(),
            verified_label: default_verified_label(),
            needs_review_label: default_needs_review_label(),
        }
    }
}

/// Display stage YAML configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayYamlConfig {
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl DisplayYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.page_size == 0 {
            return Err(ConfigLoadError::Validation(
                "display.page_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DisplayYamlConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            page_size: default_page_size(),
        }
    }
}

/// Lead database YAML configuration. Credentials arrive via
/// [`PipelineConfig::overlay_env`], not the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadYamlConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub database_id: Option<String>,

    #[serde(default = "default_lead_api_base")]
    pub api_base: String,

    #[serde(default = "default_lead_api_version")]
    pub api_version: String,

    #[serde(default = "default_lead_timeout")]
    pub timeout_secs: u64,
}

impl LeadYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "lead.timeout_secs must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LeadYamlConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            database_id: None,
            api_base: default_lead_api_base(),
            api_version: default_lead_api_version(),
            timeout_secs: default_lead_timeout(),
        }
    }
}

// Helper functions for serde defaults
fn default_allowed_hosts() -> Vec<String> {
    DEFAULT_ALLOWED_HOSTS
        .iter()
        .map(|host| host.to_string())
        .collect()
}
fn default_verified_label() -> String {
    "verified".to_string()
}
fn default_needs_review_label() -> String {
    "needs-review".to_string()
}
fn default_cache_ttl() -> u64 {
    300
}
fn default_page_size() -> usize {
    9
}
fn default_lead_api_base() -> String {
    "https://api.notion.com".to_string()
}
fn default_lead_api_version() -> String {
    "2022-06-28".to_string()
}
fn default_lead_timeout() -> u64 {
    15
}
