//! Wire types for the document store.
//!
//! [`RawDocument`] mirrors the store's issue shape closely enough to
//! deserialize its REST responses; the read side hands these to the parser
//! untouched. [`DocumentPayload`] is the write shape, [`StoreOutcome`] the
//! caller-facing result of an idempotent create.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category label on a stored document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    /// Label name, e.g. `testimony` or `verified`.
    pub name: String,
}

/// A document as the store returns it.
///
/// `body` is optional because the store permits empty issues; the parser
/// treats a missing body as empty text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawDocument {
    /// Store-assigned opaque id.
    pub id: u64,
    /// Human-facing sequence number.
    pub number: u64,
    /// Document title.
    pub title: String,
    /// Full text body, absent for empty documents.
    #[serde(default)]
    pub body: Option<String>,
    /// Labels currently attached.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Browser URL of the document.
    pub html_url: String,
    /// Creation time, assigned by the store.
    pub created_at: DateTime<Utc>,
}

impl RawDocument {
    /// True when the document carries the named label.
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    /// Body text, empty when the store returned none.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// The JSON payload posted when creating a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentPayload {
    /// Document title.
    pub title: String,
    /// Full text body.
    pub body: String,
    /// Category labels to attach.
    pub labels: Vec<String>,
    /// Reviewer assignees. Omitted from the JSON when empty so a
    /// reduced-payload retry is a genuinely smaller request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

/// Result of an idempotent create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreOutcome {
    /// Store-assigned id, zero in dry-run mode.
    pub id: u64,
    /// Document number, zero in dry-run mode.
    pub number: u64,
    /// Browser URL of the document.
    pub url: String,
    /// False when an existing document with the same fingerprint was
    /// found, or in dry-run mode.
    pub created: bool,
}
