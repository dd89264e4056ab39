//! Content fingerprints for at-most-once document creation.
//!
//! The fingerprint identifies a submission by its content, so a retry with
//! identical fields maps to the same existing document instead of creating
//! a duplicate. The store client searches for this value before writing.
//!
//! # Algorithm
//!
//! ```text
//! SHA-256(0x01 || name || 0x00 || trip || 0x00 || narrative || 0x00 || url1 \n url2 ...)
//! ```
//!
//! - `0x01`: fingerprint format version, bumped if the layout ever changes
//! - `0x00`: field separator, cannot appear in sanitized field values
//! - fields: NFC-normalized, trimmed, **unescaped** values
//! - URLs: hosted media URLs in submission order, joined with `\n`
//!
//! Hashing the raw values rather than their header-escaped form fixes one
//! canonical pre-hash representation, so a client and a server that escape
//! differently still agree on the fingerprint.
//!
//! # Examples
//!
//! ```rust
//! use document::fingerprint;
//!
//! let a = fingerprint("Ana", "Camino", "Walked.", &[]);
//! let b = fingerprint("Ana", "Camino", "Walked.", &[]);
//! assert_eq!(a, b);
//! assert_eq!(a.len(), 64);
//! ```

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// Fingerprint format version byte.
const FINGERPRINT_VERSION: u8 = 1;

/// Computes the content fingerprint for a submission.
///
/// Returns a 64-character lowercase hex SHA-256 digest. Deterministic for
/// the same field values on any machine; composed and decomposed Unicode
/// spellings of the same text produce the same fingerprint.
pub fn fingerprint(name: &str, trip: &str, narrative: &str, media_urls: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update([FINGERPRINT_VERSION]);
    hasher.update(canonical_field(name));
    hasher.update([0]);
    hasher.update(canonical_field(trip));
    hasher.update([0]);
    hasher.update(canonical_field(narrative));
    hasher.update([0]);
    hasher.update(media_urls.join("\n"));
    hex::encode(hasher.finalize())
}

fn canonical_field(value: &str) -> String {
    value.trim().nfc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest_without_media() {
        assert_eq!(
            fingerprint("Ana", "Camino", "Walked.", &[]),
            "b1890177404293a194adc94e8eb056cc8e24591e992ed8e61147f9a7c0db5e41"
        );
    }

    #[test]
    fn known_digest_with_media() {
        let urls = vec![
            "https://res.cloudinary.com/demo/image/upload/v1/a.jpg".to_string(),
            "https://res.cloudinary.com/demo/video/upload/v1/b.mp4".to_string(),
        ];
        assert_eq!(
            fingerprint("Ana", "Camino", "Walked.", &urls),
            "fb4a2b931e5bd9b6f1b6d673591c6c948f8389d71955d2926aa626e2e721c154"
        );
    }

    #[test]
    fn unicode_equivalence_nfc() {
        let composed = fingerprint("Mar\u{00ED}a", "Lourdes", "Fui.", &[]);
        let decomposed = fingerprint("Mari\u{0301}a", "Lourdes", "Fui.", &[]);
        assert_eq!(composed, decomposed);
    }

    #[test]
    fn fields_do_not_bleed_across_separators() {
        let a = fingerprint("ab", "c", "x", &[]);
        let b = fingerprint("a", "bc", "x", &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn media_order_matters() {
        let forward = vec!["https://a".to_string(), "https://b".to_string()];
        let reverse = vec!["https://b".to_string(), "https://a".to_string()];
        assert_ne!(
            fingerprint("Ana", "Camino", "Walked.", &forward),
            fingerprint("Ana", "Camino", "Walked.", &reverse)
        );
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        assert_eq!(
            fingerprint("  Ana ", "Camino", "Walked.", &[]),
            fingerprint("Ana", "Camino", "Walked.", &[])
        );
    }
}
