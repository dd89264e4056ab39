//! Lead-form data types.

use serde::{Deserialize, Serialize};

/// A contact-form body as the wire delivers it.
///
/// Field names are camelCase on the wire. `website` is the hidden
/// spam-trap field; human submitters never fill it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLead {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub preferred_contact: Option<String>,
    #[serde(default)]
    pub pilgrimage_interest: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub consent_contact: bool,
    #[serde(default)]
    pub consent_marketing: bool,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub source_page: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
}

/// How the lead wants to be reached.
///
/// The select names written to the database are the Spanish-facing
/// labels the sales team configured, regardless of input spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredContact {
    WhatsApp,
    Sms,
    Call,
    Email,
}

impl PreferredContact {
    /// Parses wire and database spellings, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "whatsapp" => Some(PreferredContact::WhatsApp),
            "sms" | "texto" | "texto (sms)" | "text" => Some(PreferredContact::Sms),
            "call" | "llamada" | "phone" => Some(PreferredContact::Call),
            "email" | "correo" => Some(PreferredContact::Email),
            _ => None,
        }
    }

    /// The select option name in the lead database.
    pub fn select_name(&self) -> &'static str {
        match self {
            PreferredContact::WhatsApp => "WhatsApp",
            PreferredContact::Sms => "Texto (SMS)",
            PreferredContact::Call => "Llamada",
            PreferredContact::Email => "Correo",
        }
    }
}

/// A validated lead, ready to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub preferred_contact: PreferredContact,
    pub pilgrimage_interest: String,
    pub message: Option<String>,
    pub consent_contact: bool,
    pub consent_marketing: bool,
    pub source_page: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

impl Lead {
    /// Title-field value: first and last name joined.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
