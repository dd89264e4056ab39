//! Body cleaning for stored documents.
//!
//! Runs a fixed sequence of strip passes over the content section. Order
//! matters: media markup and comments go first, then header-echo lines,
//! then the email passes, then separators, then whitespace collapse.
//!
//! Invariant: no email address and no header syntax reaches the returned
//! text. The email passes are a privacy requirement, the header passes
//! keep half-parsed documents from leaking their metadata into the page.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_MEDIA: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").unwrap());

static HTML_IMG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<img[^>]*>").unwrap());

static HTML_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static HEADER_ECHO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?mi)^(?:name|trip|language|rating|tags|fingerprint):\s*".*?"$|^(?:featured|verified):\s*(?:true|false)$"#,
    )
    .unwrap()
});

static EMAIL_LABEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^(?:---\s*)?\*\*(?:Email|Contact email|Email de contacto):\*\*.*$").unwrap()
});

static EMAIL_PLAIN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^\s*Email:\s*\S+@\S+\.\S+\s*$").unwrap());

static BARE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

static SEPARATOR_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*---\s*$").unwrap());

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Cleans a content section for rendering.
pub(crate) fn clean_body(content: &str) -> String {
    let text = MARKDOWN_MEDIA.replace_all(content, "");
    let text = HTML_IMG.replace_all(&text, "");
    let text = HTML_COMMENT.replace_all(&text, "");
    let text = HEADER_ECHO.replace_all(&text, "");
    let text = EMAIL_LABEL_LINE.replace_all(&text, "");
    let text = EMAIL_PLAIN_LINE.replace_all(&text, "");
    let text = BARE_EMAIL.replace_all(&text, "");
    let text = SEPARATOR_LINE.replace_all(&text, "");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
