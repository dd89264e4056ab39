//! Lead-form intake: validation plus the Notion pages client.
//!
//! This flow is independent of the testimony pipeline. A lead is a sales
//! contact, not a story: it is validated here and written as one page
//! into a Notion database, and nothing ever reads it back through this
//! codebase.
//!
//! Validation reuses the submission crate's sanitization and field rules
//! so both public forms reject the same shapes of garbage.

mod config;
mod error;
mod types;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tracing::{info, warn};

use submission::{is_valid_email, is_valid_phone, sanitize_block, sanitize_line, ValidationFailure};

pub use crate::config::{LeadConfig, LeadConfigError};
pub use crate::error::LeadError;
pub use crate::types::{Lead, PreferredContact, RawLead};

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to build HTTP client")
});

const INTEREST_MAX_CHARS: usize = 2000;
const MESSAGE_MAX_CHARS: usize = 2000;
const UTM_MAX_CHARS: usize = 200;

/// Validates a raw lead body into a [`Lead`].
///
/// A filled `website` field returns [`ValidationFailure::Honeypot`];
/// the lead endpoint answers that with a 400, unlike the testimony
/// endpoint's silent success.
pub fn validate_lead(raw: RawLead) -> Result<Lead, ValidationFailure> {
    if raw.website.as_deref().is_some_and(|w| !w.trim().is_empty()) {
        return Err(ValidationFailure::Honeypot);
    }

    let mut errors: BTreeMap<String, String> = BTreeMap::new();

    let first_name = sanitize_line(raw.first_name, true);
    let last_name = sanitize_line(raw.last_name, true);
    let email = sanitize_line(raw.email, true);
    let phone = sanitize_line(raw.phone, true);
    let interest = sanitize_block(raw.pilgrimage_interest, true);
    let message = sanitize_block(raw.message, true);

    if first_name.is_none() {
        errors.insert("firstName".into(), "First name is required".into());
    }
    if last_name.is_none() {
        errors.insert("lastName".into(), "Last name is required".into());
    }
    match email.as_deref() {
        None => {
            errors.insert("email".into(), "Email is required".into());
        }
        Some(value) if !is_valid_email(value) => {
            errors.insert("email".into(), "Invalid email format".into());
        }
        Some(_) => {}
    }
    match phone.as_deref() {
        None => {
            errors.insert("phone".into(), "Phone is required".into());
        }
        Some(value) if !is_valid_phone(value) => {
            errors.insert("phone".into(), "Invalid phone number".into());
        }
        Some(_) => {}
    }
    if interest.is_none() {
        errors.insert(
            "pilgrimageInterest".into(),
            "Pilgrimage interest is required".into(),
        );
    }

    let preferred_contact = match raw.preferred_contact.as_deref().map(str::trim) {
        None | Some("") => {
            errors.insert(
                "preferredContact".into(),
                "Preferred contact is required".into(),
            );
            None
        }
        Some(value) => {
            let parsed = PreferredContact::parse(value);
            if parsed.is_none() {
                errors.insert(
                    "preferredContact".into(),
                    "Preferred contact must be WhatsApp, SMS, Call or Email".into(),
                );
            }
            parsed
        }
    };

    if !raw.consent_contact {
        errors.insert("consentContact".into(), "Consent to contact is required".into());
    }

    if !errors.is_empty() {
        return Err(ValidationFailure::Invalid { errors });
    }

    // The unwraps above are guarded by the error map being empty.
    Ok(Lead {
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        phone: phone.unwrap_or_default(),
        preferred_contact: preferred_contact.unwrap_or(PreferredContact::Email),
        pilgrimage_interest: interest.unwrap_or_default(),
        message,
        consent_contact: raw.consent_contact,
        consent_marketing: raw.consent_marketing,
        source_page: sanitize_line(raw.source_page, true).unwrap_or_default(),
        utm_source: sanitize_line(raw.utm_source, true),
        utm_medium: sanitize_line(raw.utm_medium, true),
        utm_campaign: sanitize_line(raw.utm_campaign, true),
    })
}

/// The page-create request body for a lead.
///
/// Exposed so callers can inspect the would-be write without network
/// access.
pub fn page_payload(lead: &Lead, database_id: &str, submitted_at: DateTime<Utc>) -> Value {
    let mut properties = json!({
        "Name": { "title": [{ "text": { "content": lead.full_name() } }] },
        "Email": { "email": lead.email },
        "Phone": { "rich_text": [{ "text": { "content": lead.phone } }] },
        "Preferred Contact": { "select": { "name": lead.preferred_contact.select_name() } },
        "Pilgrimage Interest": {
            "rich_text": [{ "text": { "content": truncate_chars(&lead.pilgrimage_interest, INTEREST_MAX_CHARS) } }]
        },
        "Consent Contact": { "checkbox": lead.consent_contact },
        "Consent Marketing": { "checkbox": lead.consent_marketing },
        "Source Page": { "rich_text": [{ "text": { "content": lead.source_page } }] },
        "Submitted At": { "date": { "start": submitted_at.to_rfc3339() } },
    });

    let map = properties.as_object_mut().unwrap_or_else(|| unreachable!());
    if let Some(message) = lead.message.as_deref() {
        map.insert(
            "Message".into(),
            json!({ "rich_text": [{ "text": { "content": truncate_chars(message, MESSAGE_MAX_CHARS) } }] }),
        );
    }
    for (property, value) in [
        ("UTM Source", lead.utm_source.as_deref()),
        ("UTM Medium", lead.utm_medium.as_deref()),
        ("UTM Campaign", lead.utm_campaign.as_deref()),
    ] {
        if let Some(value) = value {
            map.insert(
                property.into(),
                json!({ "rich_text": [{ "text": { "content": truncate_chars(value, UTM_MAX_CHARS) } }] }),
            );
        }
    }

    json!({
        "parent": { "database_id": database_id },
        "properties": properties,
    })
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Identifier of the stored lead page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadOutcome {
    pub id: String,
}

/// Writes leads into the configured database.
#[derive(Debug, Clone)]
pub struct LeadClient {
    config: LeadConfig,
}

impl LeadClient {
    pub fn new(config: LeadConfig) -> Self {
        LeadClient { config }
    }

    /// Creates one page for the lead.
    pub async fn submit(&self, lead: &Lead) -> Result<LeadOutcome, LeadError> {
        let start = Instant::now();

        match self.submit_inner(lead).await {
            Ok(outcome) => {
                info!(
                    lead_id = %outcome.id,
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "lead_create_success"
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "lead_create_failure"
                );
                Err(err)
            }
        }
    }

    async fn submit_inner(&self, lead: &Lead) -> Result<LeadOutcome, LeadError> {
        self.config
            .validate()
            .map_err(|e| LeadError::Config(e.to_string()))?;

        // validate() guarantees both credentials are present.
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let database_id = self.config.database_id.as_deref().unwrap_or_default();
        let payload = page_payload(lead, database_id, Utc::now());

        let response = HTTP_CLIENT
            .post(self.config.pages_url())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .bearer_auth(api_key)
            .header("Notion-Version", &self.config.api_version)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LeadError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| LeadError::InvalidResponse(format!("non-JSON response: {e}")))?;

        if !status.is_success() {
            return Err(error_for_response(status.as_u16(), &body));
        }

        match body.get("id").and_then(Value::as_str) {
            Some(id) => Ok(LeadOutcome { id: id.to_string() }),
            None => Err(LeadError::InvalidResponse(
                "success response missing `id`".to_string(),
            )),
        }
    }
}

fn error_for_response(status: u16, body: &Value) -> LeadError {
    let code = body.get("code").and_then(Value::as_str).unwrap_or("");
    let detail = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no detail")
        .to_string();

    match code {
        "validation_error" => LeadError::Validation { detail },
        "unauthorized" | "restricted_resource" => LeadError::Auth { status },
        "object_not_found" => LeadError::NotFound(detail),
        _ => LeadError::Api { status, detail },
    }
}
