//! The parsed, renderable testimonial record.
//!
//! A [`TestimonialRecord`] is derived from a stored document on every
//! fetch and never persisted. Its `content` field has been through the
//! full cleaning pass, so it is safe to hand to a renderer: no header
//! syntax, no media markup, no email addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use submission::{Language, MediaKind};

/// A media reference that survived the host allow-list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaItem {
    /// Hosted media URL.
    pub url: String,
    /// Alt text for rendering.
    pub alt: String,
    /// Kind guessed from the URL, image when unknown.
    pub kind: MediaKind,
}

/// A testimonial derived from one stored document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestimonialRecord {
    /// Document number in the store.
    pub id: u64,
    /// Author display name.
    pub name: String,
    /// Trip description from the header.
    pub trip: String,
    /// Cleaned narrative text.
    pub content: String,
    /// Allow-listed media, header order first.
    pub media: Vec<MediaItem>,
    /// Destination derived from the trip text.
    pub destination: String,
    /// Declared or inferred language.
    pub language: Language,
    /// True when moderators set `featured` in the header.
    pub featured: bool,
    /// True when moderators attached the verified label.
    pub verified: bool,
    /// True while the review label is still attached.
    pub needs_review: bool,
    /// Rough trip month/year scanned from the trip text.
    pub trip_date: Option<String>,
    /// Star rating from the header, when numeric.
    pub rating: Option<f64>,
    /// Tags from the comma-joined header value.
    pub tags: Vec<String>,
    /// Document creation time.
    pub created_at: DateTime<Utc>,
    /// Browser URL of the backing document.
    pub url: String,
}

impl TestimonialRecord {
    /// True when the record may appear on the public site.
    pub fn is_public(&self) -> bool {
        self.verified
    }
}
