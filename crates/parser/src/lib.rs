//! Parses stored testimony documents into renderable records.
//!
//! The store gives us raw documents: a title, a markdown body that usually
//! opens with a `---` header block, and labels. This crate turns each one
//! into a [`TestimonialRecord`] with the header fields lifted out, the
//! body cleaned of header echoes and email addresses, and media filtered
//! through a host allow-list.
//!
//! Documents without a header block still produce a record. Moderators
//! occasionally write one by hand, and losing it over a missing `---` is
//! worse than a record with fallback fields. A document is dropped only
//! when no usable narrative survives cleaning, or when a header-bearing
//! document names nobody at all.
//!
//! Parsing is pure: same document in, same record out, no stored state.

mod clean;
mod frontmatter;
mod heuristics;
mod media;
mod record;

use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn, Level};

use store::RawDocument;
use submission::Language;

pub use crate::record::{MediaItem, TestimonialRecord};

static TITLE_NAME_ES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Testimonio de\s+(.+?)\s*[-\u{2013}]").unwrap());

static TITLE_NAME_EN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Testimony (?:of|from)\s+(.+?)\s*[-\u{2013}]").unwrap());

/// Hosts media URLs may come from, matched exactly or as a subdomain.
pub const DEFAULT_ALLOWED_HOSTS: [&str; 7] = [
    "imgur.com",
    "i.imgur.com",
    "github.com",
    "user-images.githubusercontent.com",
    "raw.githubusercontent.com",
    "res.cloudinary.com",
    "cloudinary.com",
];

/// Parser settings.
///
/// | Field | Meaning | Default |
/// |-------|---------|---------|
/// | `allowed_media_hosts` | Hosts media may be served from | [`DEFAULT_ALLOWED_HOSTS`] |
/// | `verified_label` | Label that marks moderator approval | `verified` |
/// | `needs_review_label` | Label present until review finishes | `needs-review` |
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub allowed_media_hosts: Vec<String>,
    pub verified_label: String,
    pub needs_review_label: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            allowed_media_hosts: DEFAULT_ALLOWED_HOSTS
                .iter()
                .map(|h| h.to_string())
                .collect(),
            verified_label: "verified".to_string(),
            needs_review_label: "needs-review".to_string(),
        }
    }
}

/// Parses a batch of stored documents, newest ordering preserved.
///
/// Unparseable documents are logged and skipped, never fatal. The output
/// length is therefore at most the input length.
pub fn parse_all(documents: &[RawDocument], cfg: &ParserConfig) -> Vec<TestimonialRecord> {
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "parser.parse_all", document_count = documents.len());
    let _guard = span.enter();

    let records: Vec<TestimonialRecord> = documents
        .iter()
        .filter_map(|doc| parse_one(doc, cfg))
        .collect();

    info!(
        parsed_count = records.len(),
        dropped_count = documents.len() - records.len(),
        elapsed_micros = start.elapsed().as_micros() as u64,
        "parse_batch_complete"
    );
    records
}

/// Parses a single stored document.
///
/// Returns `None` when no narrative text survives cleaning; everything
/// else yields a record, with fallback fields when the header is missing.
pub fn parse_one(document: &RawDocument, cfg: &ParserConfig) -> Option<TestimonialRecord> {
    let body = document.body_text();

    let record = match frontmatter::split_frontmatter(body) {
        Some((header_text, content)) => {
            from_header(document, frontmatter::parse_header(header_text), content, cfg)
        }
        None => from_bare_body(document, body, cfg),
    };

    match record {
        Some(record) => Some(record),
        None => {
            warn!(document_number = document.number, "parse_drop");
            None
        }
    }
}

fn from_header(
    document: &RawDocument,
    header: frontmatter::Header,
    content: &str,
    cfg: &ParserConfig,
) -> Option<TestimonialRecord> {
    let content_clean = clean::clean_body(content);
    if content_clean.is_empty() {
        return None;
    }

    let name = header
        .get("name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| name_from_title(&document.title))?;

    let trip = header
        .get("trip")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Pilgrimage Experience")
        .to_string();

    let language = header
        .get("language")
        .and_then(Language::parse)
        .unwrap_or_else(|| heuristics::detect_language(&content_clean));

    let media = media::extract_media(&header.media, content, &cfg.allowed_media_hosts);
    if header.media.len() > media.len() {
        debug!(
            document_number = document.number,
            declared = header.media.len(),
            kept = media.len(),
            "media_filtered"
        );
    }

    Some(TestimonialRecord {
        id: document.number,
        destination: heuristics::extract_destination(&trip),
        trip_date: heuristics::extract_trip_date(&trip),
        rating: header.get("rating").and_then(heuristics::parse_rating),
        tags: header.get("tags").map(heuristics::parse_tags).unwrap_or_default(),
        name,
        trip,
        content: content_clean,
        media,
        language,
        featured: header.get("featured") == Some("true"),
        verified: document.has_label(&cfg.verified_label),
        needs_review: document.has_label(&cfg.needs_review_label),
        created_at: document.created_at,
        url: document.html_url.clone(),
    })
}

fn from_bare_body(
    document: &RawDocument,
    body: &str,
    cfg: &ParserConfig,
) -> Option<TestimonialRecord> {
    let content_clean = clean::clean_body(body);
    if content_clean.is_empty() {
        return None;
    }

    Some(TestimonialRecord {
        id: document.number,
        name: name_from_title(&document.title).unwrap_or_else(|| "Anonymous".to_string()),
        trip: "Pilgrimage Experience".to_string(),
        language: heuristics::detect_language(&content_clean),
        media: media::extract_media(&[], body, &cfg.allowed_media_hosts),
        destination: "Unknown".to_string(),
        trip_date: None,
        rating: None,
        tags: Vec::new(),
        content: content_clean,
        featured: false,
        verified: document.has_label(&cfg.verified_label),
        needs_review: document.has_label(&cfg.needs_review_label),
        created_at: document.created_at,
        url: document.html_url.clone(),
    })
}

fn name_from_title(title: &str) -> Option<String> {
    TITLE_NAME_ES
        .captures(title)
        .or_else(|| TITLE_NAME_EN.captures(title))
        .map(|captures| captures[1].trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use store::Label;

    fn raw_document(title: &str, body: &str, labels: &[&str]) -> RawDocument {
        RawDocument {
            id: 1042,
            number: 42,
            title: title.to_string(),
            body: Some(body.to_string()),
            labels: labels
                .iter()
                .map(|l| Label {
                    name: l.to_string(),
                })
                .collect(),
            html_url: "https://documents.example/testimonies/42".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 5, 12, 9, 30, 0).unwrap(),
        }
    }

    const FULL_BODY: &str = "---\nname: \"Ana Garcia\"\ntrip: \"Camino de Santiago (Mayo 2025)\"\nlanguage: es\nfeatured: false\nverified: false\nrating: \"5\"\ntags: \"pilgrimage, faith, testimony\"\nfingerprint: \"abc123\"\nmedia:\n  - url: \"https://res.cloudinary.com/demo/image/upload/a.jpg\"\n    alt: \"Foto del Testimonio\"\n---\n\nCaminamos dos semanas por el norte y fue una experiencia de fe.\n\n## Media del Testimonio\n\n![Foto del Testimonio](https://res.cloudinary.com/demo/image/upload/a.jpg)\n\n---\n**Enviado:** 12/5/2025\n**Email de contacto:** ana@example.com\n";

    #[test]
    fn full_document_parses_every_field() {
        let doc = raw_document(
            "Testimonio de Ana Garcia - Camino de Santiago",
            FULL_BODY,
            &["testimony", "needs-review"],
        );
        let record = parse_one(&doc, &ParserConfig::default()).unwrap();

        assert_eq!(record.id, 42);
        assert_eq!(record.name, "Ana Garcia");
        assert_eq!(record.trip, "Camino de Santiago (Mayo 2025)");
        assert_eq!(record.destination, "Camino de Santiago");
        assert_eq!(record.trip_date.as_deref(), Some("May 2025"));
        assert_eq!(record.language, Language::Es);
        assert_eq!(record.rating, Some(5.0));
        assert_eq!(record.tags, vec!["pilgrimage", "faith", "testimony"]);
        assert_eq!(record.media.len(), 1);
        assert_eq!(record.media[0].alt, "Foto del Testimonio");
        assert!(!record.featured);
        assert!(!record.verified);
        assert!(record.needs_review);
        assert!(record.content.contains("Caminamos"));
        assert_eq!(record.url, "https://documents.example/testimonies/42");
    }

    #[test]
    fn no_email_or_header_syntax_reaches_the_record() {
        let doc = raw_document("Testimonio de Ana - Camino", FULL_BODY, &["testimony"]);
        let record = parse_one(&doc, &ParserConfig::default()).unwrap();

        assert!(!record.content.contains('@'));
        assert!(!record.content.contains("fingerprint"));
        assert!(!record.content.contains("!["));
        assert!(!record.content.contains("contacto"));
    }

    #[test]
    fn verified_label_controls_publication() {
        let doc = raw_document(
            "Testimonio de Ana - Camino",
            FULL_BODY,
            &["testimony", "verified"],
        );
        let record = parse_one(&doc, &ParserConfig::default()).unwrap();
        assert!(record.verified);
        assert!(!record.needs_review);
        assert!(record.is_public());
    }

    #[test]
    fn bare_body_gets_fallback_fields() {
        let doc = raw_document(
            "Testimony from John - Rome",
            "We walked the Via Francigena and it changed us.",
            &["testimony"],
        );
        let record = parse_one(&doc, &ParserConfig::default()).unwrap();

        assert_eq!(record.name, "John");
        assert_eq!(record.trip, "Pilgrimage Experience");
        assert_eq!(record.destination, "Unknown");
        assert_eq!(record.language, Language::En);
        assert!(record.trip_date.is_none());
        assert!(record.rating.is_none());
    }

    #[test]
    fn unmatchable_title_falls_back_to_anonymous() {
        let doc = raw_document("A handwritten note", "Some story worth keeping.", &[]);
        let record = parse_one(&doc, &ParserConfig::default()).unwrap();
        assert_eq!(record.name, "Anonymous");
    }

    #[test]
    fn empty_cleaned_content_drops_the_document() {
        let doc = raw_document(
            "Testimonio de Ana - Camino",
            "---\nname: \"Ana\"\n---\n\n![x](https://res.cloudinary.com/a.jpg)\n",
            &["testimony"],
        );
        assert!(parse_one(&doc, &ParserConfig::default()).is_none());
    }

    #[test]
    fn disallowed_media_is_filtered_not_fatal() {
        let body = "---\nname: \"Ana\"\ntrip: \"Camino\"\nmedia:\n  - url: \"https://evil.example/a.jpg\"\n---\n\nThe story itself.\n";
        let doc = raw_document("Testimonio de Ana - Camino", body, &["testimony"]);
        let record = parse_one(&doc, &ParserConfig::default()).unwrap();
        assert!(record.media.is_empty());
        assert_eq!(record.content, "The story itself.");
    }

    #[test]
    fn parse_all_skips_unparseable_documents() {
        let good = raw_document("Testimonio de Ana - Camino", FULL_BODY, &["testimony"]);
        let empty = raw_document("Testimonio de X - Y", "---\nname: \"X\"\n---\n\n", &[]);
        let records = parse_all(&[good, empty], &ParserConfig::default());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn english_document_with_contact_footer_parses_clean() {
        let body = "---\nname: \"Maria Lopez\"\ntrip: \"Fatima (October 2024)\"\nlanguage: en\nfeatured: false\nverified: false\nrating: \"4.5\"\ntags: \"pilgrimage\"\nfingerprint: \"def456\"\n---\n\nWe walked for a week and prayed at the shrine.\n\n## Testimony Media\n\n![Foto del Testimonio](https://res.cloudinary.com/demo/video/upload/v1/b.mp4)\n\n---\n**Submitted:** 10/18/2024\n**Contact email:** maria@example.com\n";
        let doc = raw_document(
            "Testimony from Maria Lopez - Fatima",
            body,
            &["testimony", "needs-review"],
        );
        let record = parse_one(&doc, &ParserConfig::default()).unwrap();

        assert_eq!(record.name, "Maria Lopez");
        assert_eq!(record.destination, "Fatima");
        assert_eq!(record.trip_date.as_deref(), Some("Oct 2024"));
        assert_eq!(record.language, Language::En);
        assert_eq!(record.rating, Some(4.5));
        assert_eq!(record.media.len(), 1);
        assert_eq!(record.media[0].kind, submission::MediaKind::Video);
        assert!(!record.content.contains('@'));
    }
}
