//! Small text heuristics for records missing explicit header fields.
//!
//! These fill gaps, they never override a declared value. All of them are
//! tuned for the short free-form trip strings pilgrims actually type, not
//! for general text.

use once_cell::sync::Lazy;
use regex::Regex;

use submission::Language;

/// Common Spanish function words, padded so they match whole words only.
const SPANISH_HINTS: [&str; 9] = [
    " el ", " la ", " de ", " y ", " que ", " con ", " para ", " experiencia ", " viaje ",
];

static MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(ene|feb|mar|abr|may|jun|jul|ago|sep|oct|nov|dic|jan|apr|aug|dec)[a-z]*\s+(\d{4})",
    )
    .unwrap()
});

static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());

/// Guesses the language of a narrative from function-word density.
///
/// Two or more Spanish hints mean Spanish; anything else is English. This
/// is deliberately biased toward English so a short text never flips to
/// Spanish on one stray "de".
pub(crate) fn detect_language(text: &str) -> Language {
    let padded = format!(" {} ", text.to_lowercase());
    let hits = SPANISH_HINTS
        .iter()
        .filter(|hint| padded.contains(*hint))
        .count();
    if hits >= 2 {
        Language::Es
    } else {
        Language::En
    }
}

/// Derives a destination from the free-form trip text.
///
/// "Camino de Santiago (Mayo 2025)" becomes "Camino de Santiago". Without
/// a parenthesis the first `-` or `,` segment is used. Empty input maps
/// to "Unknown".
pub(crate) fn extract_destination(trip: &str) -> String {
    if let Some(before) = trip.split('(').next() {
        let before = before.trim();
        if !before.is_empty() && before.len() < trip.trim().len() {
            return before.to_string();
        }
    }
    let first_segment = trip
        .split(['-', ','])
        .next()
        .map(str::trim)
        .unwrap_or("");
    if first_segment.is_empty() {
        "Unknown".to_string()
    } else {
        first_segment.to_string()
    }
}

/// Scans the trip text for a rough month and year.
///
/// Matches a month prefix followed by a year ("Mayo 2025" yields
/// "May 2025", keeping only the three-letter prefix), or a bare 20xx year.
pub(crate) fn extract_trip_date(trip: &str) -> Option<String> {
    if let Some(captures) = MONTH_YEAR.captures(trip) {
        return Some(format!("{} {}", &captures[1], &captures[2]));
    }
    BARE_YEAR
        .captures(trip)
        .map(|captures| captures[1].to_string())
}

/// Parses a header rating value, `None` when not numeric.
pub(crate) fn parse_rating(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

/// Splits a comma-joined header value into trimmed, non-empty tags.
pub(crate) fn parse_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
