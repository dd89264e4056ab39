//! HTML card rendering for testimonial records.
//!
//! Every user-supplied string is escaped before it reaches the markup.
//! Media elements come only from the record's allow-listed list and each
//! one carries an `onerror` handler that hides its frame, so one broken
//! URL never leaves a hole in the card layout.

use parser::{MediaItem, TestimonialRecord};
use submission::MediaKind;

/// Escapes `& < > " '` for safe insertion into HTML text or attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Renders one record as a card.
pub fn render_card(record: &TestimonialRecord) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<article class=\"testimonial-card\" data-document=\"{}\">\n",
        record.id
    ));
    html.push_str(&format!("<h3>{}</h3>\n", escape_html(&record.name)));
    html.push_str(&format!(
        "<p class=\"trip\">{}</p>\n",
        escape_html(&record.trip)
    ));
    if let Some(stars) = star_row(record.rating) {
        html.push_str(&format!("<p class=\"rating\">{stars}</p>\n"));
    }
    for item in &record.media {
        html.push_str(&render_media(item));
    }
    html.push_str(&format!(
        "<p class=\"content\">{}</p>\n",
        escape_html(&record.content)
    ));
    if record.verified {
        html.push_str("<span class=\"badge verified\">Verified</span>\n");
    }
    html.push_str("</article>\n");
    html
}

fn render_media(item: &MediaItem) -> String {
    let url = escape_html(&item.url);
    let alt = escape_html(&item.alt);
    let element = match item.kind {
        MediaKind::Image => format!(
            "<img src=\"{url}\" alt=\"{alt}\" loading=\"lazy\" onerror=\"this.parentElement.style.display='none'\">"
        ),
        MediaKind::Video => format!(
            "<video src=\"{url}\" controls preload=\"metadata\" onerror=\"this.parentElement.style.display='none'\"></video>"
        ),
        MediaKind::Audio => format!(
            "<audio src=\"{url}\" controls onerror=\"this.parentElement.style.display='none'\"></audio>"
        ),
    };
    format!("<div class=\"media-frame\">{element}</div>\n")
}

fn star_row(rating: Option<f64>) -> Option<String> {
    let rating = rating?;
    let full = rating.round().clamp(0.0, 5.0) as usize;
    if full == 0 {
        return None;
    }
    Some("★".repeat(full))
}
