//! Header block splitting and the minimal `key: value` grammar.
//!
//! This is deliberately not a general markup parser. The grammar is the
//! handful of shapes our encoder emits: quoted or bare scalar values, and
//! one nested list form for `media:` items. Lines that match nothing are
//! ignored.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

static SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*\r?\n(.*)\z").unwrap());

static KEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z0-9_-]+)\s*:\s*(.*?)\s*$").unwrap());

static MEDIA_URL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*-\s*url:\s*"([^"]+)""#).unwrap());

static MEDIA_ALT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*alt:\s*"([^"]*)""#).unwrap());

/// A `- url:` / `alt:` pair from the header media list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeaderMedia {
    pub url: String,
    pub alt: Option<String>,
}

/// Parsed header: scalar fields plus the media list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Header {
    pub fields: BTreeMap<String, String>,
    pub media: Vec<HeaderMedia>,
}

impl Header {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Splits a document body into its header text and content.
///
/// Returns `None` when the body does not open with a `---` delimited
/// header; such documents are still parsed, just without structured
/// fields.
pub(crate) fn split_frontmatter(body: &str) -> Option<(&str, &str)> {
    let captures = SPLIT.captures(body)?;
    // Groups 1 and 2 always exist when the pattern matches.
    match (captures.get(1), captures.get(2)) {
        (Some(header), Some(content)) => Some((header.as_str(), content.as_str())),
        _ => None,
    }
}

/// Scans header lines into fields and media items.
pub(crate) fn parse_header(header_text: &str) -> Header {
    let mut header = Header::default();
    let mut in_media = false;

    for line in header_text.lines() {
        if in_media {
            if let Some(captures) = MEDIA_URL_LINE.captures(line) {
                header.media.push(HeaderMedia {
                    url: captures[1].to_string(),
                    alt: None,
                });
                continue;
            }
            if let Some(captures) = MEDIA_ALT_LINE.captures(line) {
                if let Some(last) = header.media.last_mut() {
                    last.alt = Some(captures[1].to_string());
                }
                continue;
            }
        }

        let Some(captures) = KEY_LINE.captures(line) else {
            continue;
        };
        let key = captures[1].to_string();
        let value = unquote(&captures[2]);

        if key == "media" && value.is_empty() {
            in_media = true;
            continue;
        }
        in_media = false;
        header.fields.insert(key, value);
    }

    header
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let stripped = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')));
    match stripped {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_string(),
    }
}
