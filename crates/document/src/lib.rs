//! Romeria document encoding.
//!
//! This module turns an accepted submission plus its hosted media into the
//! document the store persists: a quoted `key: "value"` header block, the
//! narrative body, a media section, and a footer with the submission date.
//!
//! ## Pure function guarantee
//!
//! No I/O and no clock calls. The submission's own `received_at` timestamp
//! is the only time source, so encoding the same submission twice gives
//! byte-identical output on any machine.
//!
//! ## Invariants worth knowing
//!
//! - Header values are quote-escaped; the fingerprint is computed over the
//!   raw values, never the escaped ones
//! - Media appears twice on purpose: a structured header array and
//!   Markdown references in the body, and readers accept either form
//! - `fingerprint` = SHA-256(0x01 || name || 0x00 || trip || 0x00 ||
//!   narrative || 0x00 || joined media URLs)
//!
//! Bottom line: same submission + same media = same document forever.
//!
//! # Example
//!
//! ```rust
//! use document::encode;
//! # use submission::{Language, Submission};
//! # use chrono::{TimeZone, Utc};
//! # use uuid::Uuid;
//!
//! let submission = Submission {
//!     id: Uuid::nil(),
//!     name: "Ana".into(),
//!     trip: "Camino de Santiago".into(),
//!     narrative: "Walked for two weeks.".into(),
//!     email: None,
//!     language: Language::En,
//!     media: vec![],
//!     received_at: Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap(),
//! };
//!
//! let doc = encode(&submission, &[]);
//! assert_eq!(doc.title, "Testimony from Ana - Camino de Santiago");
//! assert!(doc.body.starts_with("---\n"));
//! assert!(doc.body.contains(&doc.fingerprint));
//! ```

mod escape;
mod fingerprint;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use media::UploadedMedia;
use submission::{Language, MediaKind, Submission};

pub use crate::escape::escape_value;
pub use crate::fingerprint::fingerprint;

/// Labels every new testimony document carries. Moderators flip
/// `needs-review` to `verified` to publish.
pub const DEFAULT_LABELS: [&str; 2] = ["testimony", "needs-review"];

const DEFAULT_RATING: &str = "5";
const DEFAULT_TAGS: &str = "pilgrimage, faith, testimony";

/// A document ready for the store: title, full text body, and labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncodedDocument {
    /// Store title, from the localized template.
    pub title: String,
    /// Header block, narrative, media section, and footer.
    pub body: String,
    /// Category labels attached at creation.
    pub labels: Vec<String>,
    /// Content fingerprint, also embedded in the header.
    pub fingerprint: String,
}

/// Encodes a validated submission and its hosted media into a document.
pub fn encode(submission: &Submission, media: &[UploadedMedia]) -> EncodedDocument {
    let urls: Vec<String> = media.iter().map(|m| m.url.clone()).collect();
    let fingerprint = fingerprint::fingerprint(
        &submission.name,
        &submission.trip,
        &submission.narrative,
        &urls,
    );

    let mut lines = header_lines(submission, media, &fingerprint);

    lines.push(String::new());
    lines.push(submission.narrative.clone());
    lines.push(String::new());

    if !media.is_empty() {
        lines.push(format!("## {}", media_section_label(submission.language)));
        for item in media {
            lines.push(format!("![{}]({})", alt_text(item.kind), item.url));
        }
        lines.push(String::new());
    }

    lines.push("---".to_string());
    lines.push(format!(
        "**{}:** {}",
        submitted_label(submission.language),
        locale_date(submission.received_at, submission.language)
    ));
    if let Some(email) = submission.email.as_deref() {
        lines.push(format!(
            "**{}:** {}",
            contact_label(submission.language),
            email
        ));
    }

    EncodedDocument {
        title: title(submission),
        body: lines.join("\n"),
        labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
        fingerprint,
    }
}

fn header_lines(
    submission: &Submission,
    media: &[UploadedMedia],
    fingerprint: &str,
) -> Vec<String> {
    let mut lines = vec![
        "---".to_string(),
        format!("name: \"{}\"", escape_value(&submission.name)),
        format!("trip: \"{}\"", escape_value(&submission.trip)),
        format!("language: \"{}\"", submission.language.as_str()),
        "featured: false".to_string(),
        "verified: false".to_string(),
        format!("rating: \"{DEFAULT_RATING}\""),
        format!("tags: \"{DEFAULT_TAGS}\""),
        format!("fingerprint: \"{fingerprint}\""),
    ];
    if !media.is_empty() {
        lines.push("media:".to_string());
        for item in media {
            lines.push(format!("  - url: \"{}\"", escape_value(&item.url)));
            lines.push(format!("    alt: \"{}\"", escape_value(alt_text(item.kind))));
        }
    }
    lines.push("---".to_string());
    lines
}

fn title(submission: &Submission) -> String {
    match submission.language {
        Language::Es => format!("Testimonio de {} - {}", submission.name, submission.trip),
        Language::En => format!("Testimony from {} - {}", submission.name, submission.trip),
    }
}

// The site has always used Spanish alt text in both languages.
fn alt_text(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "Foto del Testimonio",
        MediaKind::Video => "Video del Testimonio",
        MediaKind::Audio => "Audio del Testimonio",
    }
}

fn media_section_label(language: Language) -> &'static str {
    match language {
        Language::Es => "Media del Testimonio",
        Language::En => "Testimony Media",
    }
}

fn submitted_label(language: Language) -> &'static str {
    match language {
        Language::Es => "Enviado",
        Language::En => "Submitted",
    }
}

fn contact_label(language: Language) -> &'static str {
    match language {
        Language::Es => "Email de contacto",
        Language::En => "Contact email",
    }
}

/// Formats the submission date the way each locale writes short dates,
/// month first for English and day first for Spanish.
fn locale_date(at: DateTime<Utc>, language: Language) -> String {
    match language {
        Language::En => at.format("%-m/%-d/%Y").to_string(),
        Language::Es => at.format("%-d/%-m/%Y").to_string(),
    }
}
