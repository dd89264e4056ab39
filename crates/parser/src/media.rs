//! Media extraction and the host allow-list.
//!
//! Media references come from four places, in decreasing trust: the header
//! `media:` list, markdown image syntax in the body, HTML `<img>` tags, and
//! bare Cloudinary URLs. The four sources are merged in that order and
//! deduplicated by URL, so a header entry wins over a body echo of the same
//! asset.
//!
//! Every candidate URL goes through the allow-list before it reaches a
//! record. Matching is on the parsed host, exact or dot-separated subdomain,
//! never a substring scan of the whole URL.

use once_cell::sync::Lazy;
use regex::Regex;

use submission::MediaKind;

use crate::frontmatter::HeaderMedia;
use crate::record::MediaItem;

static MARKDOWN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\((https?://[^\s)]+)\)").unwrap());

static HTML_IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]*?src=["']([^"']+)["'][^>]*?(?:alt=["']([^"']*)["'])?[^>]*>"#)
        .unwrap()
});

static BARE_CLOUDINARY_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://res\.cloudinary\.com/[^\s)>"']+"#).unwrap());

const HEADER_ALT_FALLBACK: &str = "Testimony media";
const BODY_ALT_FALLBACK: &str = "Testimony photo";

/// Collects allow-listed media from the header list and the raw content.
pub(crate) fn extract_media(
    header_media: &[HeaderMedia],
    content: &str,
    allowed_hosts: &[String],
) -> Vec<MediaItem> {
    let mut items: Vec<MediaItem> = Vec::new();

    for entry in header_media {
        push_unique(
            &mut items,
            &entry.url,
            entry.alt.as_deref().unwrap_or(HEADER_ALT_FALLBACK),
            allowed_hosts,
        );
    }

    for captures in MARKDOWN_IMAGE.captures_iter(content) {
        let alt = captures[1].trim();
        let alt = if alt.is_empty() { BODY_ALT_FALLBACK } else { alt };
        push_unique(&mut items, &captures[2], alt, allowed_hosts);
    }

    for captures in HTML_IMG_TAG.captures_iter(content) {
        let alt = captures
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|a| !a.is_empty())
            .unwrap_or(BODY_ALT_FALLBACK);
        push_unique(&mut items, &captures[1], alt, allowed_hosts);
    }

    for found in BARE_CLOUDINARY_URL.find_iter(content) {
        push_unique(&mut items, found.as_str(), BODY_ALT_FALLBACK, allowed_hosts);
    }

    items
}

fn push_unique(items: &mut Vec<MediaItem>, url: &str, alt: &str, allowed_hosts: &[String]) {
    let url = url.trim();
    if !host_allowed(url, allowed_hosts) {
        return;
    }
    if items.iter().any(|existing| existing.url == url) {
        return;
    }
    items.push(MediaItem {
        url: url.to_string(),
        alt: alt.to_string(),
        kind: MediaKind::from_url(url).unwrap_or(MediaKind::Image),
    });
}

/// True when the URL's host is an allowed host or a subdomain of one.
pub(crate) fn host_allowed(url: &str, allowed_hosts: &[String]) -> bool {
    let Some(host) = host_of(url) else {
        return false;
    };
    allowed_hosts.iter().any(|allowed| {
        let allowed = allowed.to_ascii_lowercase();
        host == allowed || host.ends_with(&format!(".{allowed}"))
    })
}

fn host_of(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?.split(':').next()?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}
