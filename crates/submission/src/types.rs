//! Core data model types for testimony submissions.
//!
//! These types represent the shape of a testimony as it arrives from the
//! public form and the canonical record that flows to downstream pipeline
//! stages. They are designed to be:
//!
//! - **Serializable**: JSON in and out via serde, with legacy field aliases
//! - **Cloneable**: Cheap to clone for pipeline processing
//! - **Comparable**: Support equality checks for testing
//!
//! # Type Hierarchy
//!
//! ```text
//! RawSubmission
//! ├── name: Option<String>        (alias: nombre)
//! ├── trip: Option<String>        (alias: viaje)
//! ├── testimony: Option<String>   (alias: testimonio)
//! ├── email: Option<String>       (alias: correo)
//! ├── language: Option<String>    (alias: idioma)
//! ├── media: Vec<MediaFile>
//! ├── photo: Option<MediaFile>    (legacy single-file field)
//! ├── consent: Option<bool>
//! └── honeypot: Option<String>    (alias: website)
//!
//!         ↓ validate()
//!
//! Submission
//! ├── id: Uuid (deterministic, UUIDv5)
//! ├── name: String (sanitized, 2-100 chars)
//! ├── trip: String (sanitized, 5-200 chars)
//! ├── narrative: String (sanitized, 50-2000 chars)
//! ├── email: Option<String>
//! ├── language: Language
//! ├── media: Vec<MediaFile> (MIME checked, size capped)
//! └── received_at: DateTime<Utc>
//! ```
//!
//! # Examples
//!
//! ## Deserializing a Spanish form payload
//!
//! ```rust
//! use submission::RawSubmission;
//!
//! let raw: RawSubmission = serde_json::from_str(r#"{
//!     "nombre": "María",
//!     "viaje": "Camino de Santiago 2024",
//!     "testimonio": "Una experiencia inolvidable...",
//!     "idioma": "es"
//! }"#).unwrap();
//!
//! assert_eq!(raw.name.as_deref(), Some("María"));
//! assert_eq!(raw.language.as_deref(), Some("es"));
//! ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Submission and display language.
///
/// The site serves two locales. The submission language drives validation
/// message wording, document title templates, and the localized labels in
/// the encoded document body.
///
/// # Examples
///
/// ```rust
/// use submission::Language;
///
/// assert_eq!(Language::parse("es"), Some(Language::Es));
/// assert_eq!(Language::parse(" EN "), Some(Language::En));
/// assert_eq!(Language::parse("fr"), None);
/// assert_eq!(Language::default(), Language::En);
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Spanish.
    Es,
}

impl Language {
    /// Parses a language code, tolerating surrounding whitespace and case.
    ///
    /// Returns `None` for anything other than `en` or `es`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "es" => Some(Language::Es),
            _ => None,
        }
    }

    /// Returns the lowercase two-letter code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Returns true for Spanish.
    pub fn is_spanish(&self) -> bool {
        matches!(self, Language::Es)
    }
}

/// Broad media category derived from a MIME type or URL.
///
/// The category decides which provider pipeline handles the upload and
/// which size cap applies.
///
/// | Kind | Provider pipeline | Default cap |
/// |-------|------------------|-------------|
/// | `Image` | image | 10 MB |
/// | `Video` | video | 150 MB |
/// | `Audio` | video (transcoded) | 50 MB |
///
/// # Examples
///
/// ```rust
/// use submission::MediaKind;
///
/// assert_eq!(MediaKind::from_mime("image/png"), Some(MediaKind::Image));
/// assert_eq!(MediaKind::from_mime("audio/mpeg"), Some(MediaKind::Audio));
/// assert_eq!(MediaKind::from_mime("application/pdf"), None);
///
/// assert_eq!(MediaKind::from_url("https://cdn.example.com/a.webp"), Some(MediaKind::Image));
/// assert_eq!(MediaKind::from_url("https://cdn.example.com/clip.mp4?x=1"), Some(MediaKind::Video));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image (jpeg, png, gif, webp).
    Image,
    /// Video clip (mp4, webm).
    Video,
    /// Audio recording (mpeg/mp3, wav, ogg).
    Audio,
}

impl MediaKind {
    /// Classifies a declared MIME type by its top-level family.
    ///
    /// This only looks at the `image/`, `video/`, and `audio/` prefixes.
    /// Whether a specific subtype is accepted is a validation concern, see
    /// [`SubmissionConfig::allowed_mime_types`](crate::SubmissionConfig::allowed_mime_types).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else if mime.starts_with("audio/") {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }

    /// Best-effort classification of an already-hosted media URL.
    ///
    /// Used on the read side, where only URLs survive in stored documents.
    /// Falls back to the CDN path segment (`/image/upload/`, `/video/upload/`)
    /// when the URL carries no recognizable extension.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.trim().to_ascii_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or("");
        let file = path.rsplit('/').next().unwrap_or(path);
        let ext = match file.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => "",
        };
        match ext {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => Some(MediaKind::Image),
            "mp4" | "webm" | "mov" => Some(MediaKind::Video),
            "mp3" | "wav" | "ogg" | "m4a" => Some(MediaKind::Audio),
            _ if lower.contains("/video/upload/") => Some(MediaKind::Video),
            _ if lower.contains("/image/upload/") => Some(MediaKind::Image),
            _ => None,
        }
    }

    /// Lowercase label used in logs and rendered records.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

/// A single media attachment as submitted by the form.
///
/// The payload arrives base64-encoded, either bare or wrapped in a
/// `data:<mime>;base64,` URL. The declared MIME type decides routing and
/// the applicable size cap.
///
/// # Examples
///
/// ```rust
/// use submission::MediaFile;
///
/// let file = MediaFile {
///     data: "data:image/png;base64,iVBORw0KGgo=".to_string(),
///     mime_type: "image/png".to_string(),
///     name: Some("photo.png".to_string()),
///     size: None,
/// };
///
/// // Estimated from the base64 payload after the data-URL prefix.
/// assert_eq!(file.estimated_bytes(), 7);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaFile {
    /// Base64-encoded file content, with or without a data-URL prefix.
    #[serde(default)]
    pub data: String,

    /// Declared MIME type (e.g. `image/jpeg`, `video/mp4`).
    #[serde(rename = "type", alias = "mime_type", default)]
    pub mime_type: String,

    /// Original client-side filename, if the form provided one.
    #[serde(default)]
    pub name: Option<String>,

    /// Client-reported byte size. Informational only, the server always
    /// re-estimates from the base64 payload.
    #[serde(default)]
    pub size: Option<u64>,
}

impl MediaFile {
    /// Estimates the decoded byte size from the base64 payload length.
    ///
    /// A data-URL prefix (`data:<mime>;base64,`) is excluded from the
    /// estimate. The estimate is `len * 3 / 4 - 2`, which slightly
    /// undercounts unpadded payloads but is stable across clients.
    pub fn estimated_bytes(&self) -> u64 {
        let payload = match self.data.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.data.as_str(),
        };
        (payload.len() as u64 * 3 / 4).saturating_sub(2)
    }

    /// Returns the media category for the declared MIME type.
    pub fn kind(&self) -> Option<MediaKind> {
        MediaKind::from_mime(&self.mime_type)
    }
}

/// The inbound testimony as deserialized from the form payload.
///
/// Every free-text field is optional at this stage: presence and shape are
/// enforced by [`validate()`](crate::validate), not by deserialization.
/// Spanish field aliases are resolved here so nothing downstream ever sees
/// an alias.
///
/// # Field Aliases
///
/// | Canonical | Alias |
/// |-----------|----------|
/// | `name` | `nombre` |
/// | `trip` | `viaje` |
/// | `testimony` | `testimonio` |
/// | `email` | `correo` |
/// | `language` | `idioma` |
/// | `honeypot` | `website` |
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawSubmission {
    /// Pilgrim's display name.
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,

    /// Trip description, e.g. `"Camino de Santiago (Galicia) 2024"`.
    #[serde(default, alias = "viaje")]
    pub trip: Option<String>,

    /// The testimony narrative itself.
    #[serde(default, alias = "testimonio")]
    pub testimony: Option<String>,

    /// Optional contact email. Never rendered publicly.
    #[serde(default, alias = "correo")]
    pub email: Option<String>,

    /// Declared submission language code (`en` or `es`).
    #[serde(default, alias = "idioma")]
    pub language: Option<String>,

    /// Attached media files.
    #[serde(default)]
    pub media: Vec<MediaFile>,

    /// Legacy single-attachment field from the old form. Merged into
    /// `media` during validation.
    #[serde(default)]
    pub photo: Option<MediaFile>,

    /// Publication consent checkbox.
    #[serde(default)]
    pub consent: Option<bool>,

    /// Hidden spam-trap field. Humans leave it empty.
    #[serde(default, alias = "website")]
    pub honeypot: Option<String>,
}

/// A validated, sanitized testimony ready for the pipeline.
///
/// # Guarantees
///
/// - All required fields are present and within their length bounds
/// - Free text is stripped of control characters and trimmed
/// - Every media entry has an accepted MIME type and is under its size cap
/// - `id` is deterministic for identical content (UUIDv5)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    /// Deterministic submission identifier derived from the content.
    pub id: Uuid,

    /// Sanitized pilgrim name.
    pub name: String,

    /// Sanitized trip description.
    pub trip: String,

    /// Sanitized testimony narrative. Newlines are preserved.
    pub narrative: String,

    /// Sanitized contact email, if one was provided and well-formed.
    pub email: Option<String>,

    /// Resolved submission language.
    pub language: Language,

    /// Accepted media attachments with normalized MIME types.
    pub media: Vec<MediaFile>,

    /// When the submission was accepted by the validator.
    pub received_at: DateTime<Utc>,
}

impl Submission {
    /// Returns true if the submission carries at least one attachment.
    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
    }
}
