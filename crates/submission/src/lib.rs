//! Romeria Validation Layer
//!
//! This is where testimonies enter the pipeline. We take the raw form
//! payload, run it through sanitization and the field rules, and produce a
//! canonical [`Submission`] the rest of the pipeline can trust.
//!
//! ## What we do here
//!
//! - **Resolve aliases** - The Spanish form posts `nombre`/`viaje`/
//!   `testimonio`; downstream code only ever sees canonical names
//! - **Sanitize** - Strip control characters, trim, drop whitespace-only
//!   values before any length check
//! - **Enforce the rules** - Length bounds in characters, email shape,
//!   consent, accepted media formats and per-kind size caps
//! - **Localize failures** - Error messages come back in the submission's
//!   language so the form can show them verbatim
//! - **Trap spam** - A filled honeypot field rejects silently; callers
//!   answer with a generic success and skip all provider calls
//! - **Log everything** - Structured events via tracing
//!
//! ## Main entry point
//!
//! Call [`validate`] with a [`RawSubmission`] and [`SubmissionConfig`],
//! get back a [`Submission`]. Pure and synchronous, no I/O.
//!
//! ## Example
//!
//! ```
//! use submission::{validate, RawSubmission, SubmissionConfig};
//!
//! let raw = RawSubmission {
//!     name: Some("María Fernanda".into()),
//!     trip: Some("Camino de Santiago (Galicia) 2024".into()),
//!     testimony: Some(
//!         "Caminar hacia Santiago me cambió la vida. Cada etapa fue un regalo de fe.".into(),
//!     ),
//!     language: Some("es".into()),
//!     consent: Some(true),
//!     ..Default::default()
//! };
//!
//! let submission = validate(raw, &SubmissionConfig::default()).unwrap();
//! assert_eq!(submission.name, "María Fernanda");
//! assert!(submission.language.is_spanish());
//! ```
use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn, Level};
use uuid::Uuid;

mod config;
mod error;
mod messages;
mod rules;
mod types;

use crate::messages::Field;

pub use crate::config::{ConfigError, SubmissionConfig};
pub use crate::error::ValidationFailure;
pub use crate::rules::{char_length, is_valid_email, is_valid_phone, sanitize_block, sanitize_line};
pub use crate::types::{Language, MediaFile, MediaKind, RawSubmission, Submission};

/// Validates a raw testimony: resolves the language, sanitizes all fields,
/// applies the field rules, and returns a canonical [`Submission`].
pub fn validate(
    raw: RawSubmission,
    cfg: &SubmissionConfig,
) -> Result<Submission, ValidationFailure> {
    let start = Instant::now();

    // Spam trap comes first: nothing else about the payload matters.
    if raw
        .honeypot
        .as_deref()
        .is_some_and(|value| !value.trim().is_empty())
    {
        let elapsed_micros = start.elapsed().as_micros();
        warn!(elapsed_micros, "submission_spam_trap");
        return Err(ValidationFailure::Honeypot);
    }

    // Message locale: the declared language when parseable, English otherwise.
    let locale = raw
        .language
        .as_deref()
        .and_then(Language::parse)
        .unwrap_or_default();

    let span = tracing::span!(Level::INFO, "submission.validate", language = locale.as_str());
    let _guard = span.enter();

    match validate_inner(raw, locale, cfg) {
        Ok(submission) => {
            let elapsed_micros = start.elapsed().as_micros();
            info!(
                submission_id = %submission.id,
                language = submission.language.as_str(),
                media_count = submission.media.len(),
                narrative_chars = char_length(&submission.narrative),
                elapsed_micros,
                "submission_accepted"
            );
            Ok(submission)
        }
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(error = %err, elapsed_micros, "submission_rejected");
            Err(err)
        }
    }
}

/// Core validation logic: collects every field failure before returning.
fn validate_inner(
    raw: RawSubmission,
    locale: Language,
    cfg: &SubmissionConfig,
) -> Result<Submission, ValidationFailure> {
    let RawSubmission {
        name,
        trip,
        testimony,
        email,
        language,
        mut media,
        photo,
        consent,
        honeypot: _,
    } = raw;

    let strip = cfg.strip_control_chars;
    let mut errors = BTreeMap::new();

    let name = check_text(
        &mut errors,
        "name",
        Field::Name,
        sanitize_line(name, strip),
        cfg.name_min_chars,
        cfg.name_max_chars,
        locale,
    );
    let trip = check_text(
        &mut errors,
        "trip",
        Field::Trip,
        sanitize_line(trip, strip),
        cfg.trip_min_chars,
        cfg.trip_max_chars,
        locale,
    );
    let narrative = check_text(
        &mut errors,
        "testimony",
        Field::Narrative,
        sanitize_block(testimony, strip),
        cfg.narrative_min_chars,
        cfg.narrative_max_chars,
        locale,
    );

    let language = match sanitize_line(language, strip) {
        None => {
            errors.insert(
                "language".to_string(),
                messages::required(locale, Field::Language),
            );
            None
        }
        Some(value) => match Language::parse(&value) {
            Some(parsed) => Some(parsed),
            None => {
                errors.insert(
                    "language".to_string(),
                    messages::unsupported_language(locale),
                );
                None
            }
        },
    };

    let email = match sanitize_line(email, strip) {
        Some(value) if !is_valid_email(&value) => {
            errors.insert("email".to_string(), messages::invalid_email(locale));
            None
        }
        other => other,
    };

    if cfg.require_consent && consent != Some(true) {
        errors.insert(
            "consent".to_string(),
            messages::consent_required(locale),
        );
    }

    // The old form posted a single `photo`; fold it into the media list.
    if let Some(file) = photo {
        media.push(file);
    }

    for (index, file) in media.iter().enumerate() {
        let key = format!("media[{index}]");
        if file.data.trim().is_empty() || !cfg.accepts_mime(&file.mime_type) {
            errors.insert(key, messages::media_format(locale));
            continue;
        }
        let Some(kind) = file.kind() else {
            errors.insert(key, messages::media_format(locale));
            continue;
        };
        let cap = cfg.size_cap(kind);
        if file.estimated_bytes() > cap {
            errors.insert(key, messages::media_too_large(locale, kind, cap));
        }
    }

    match (name, trip, narrative, language) {
        (Some(name), Some(trip), Some(narrative), Some(language)) if errors.is_empty() => {
            let media = media
                .into_iter()
                .map(|mut file| {
                    file.mime_type = file.mime_type.trim().to_ascii_lowercase();
                    file
                })
                .collect();
            let id = derive_submission_id(cfg, &name, &trip, &narrative);
            Ok(Submission {
                id,
                name,
                trip,
                narrative,
                email,
                language,
                media,
                received_at: Utc::now(),
            })
        }
        _ => Err(ValidationFailure::Invalid { errors }),
    }
}

fn check_text(
    errors: &mut BTreeMap<String, String>,
    key: &str,
    field: Field,
    value: Option<String>,
    min: usize,
    max: usize,
    locale: Language,
) -> Option<String> {
    match value {
        None => {
            errors.insert(key.to_string(), messages::required(locale, field));
            None
        }
        Some(value) => {
            let len = char_length(&value);
            if len < min || len > max {
                errors.insert(key.to_string(), messages::length(locale, field, min, max));
                None
            } else {
                Some(value)
            }
        }
    }
}

/// Derives a deterministic submission id from the content fields.
///
/// Same name, trip, and narrative always yield the same id, which lets the
/// pipeline attribute retries of the same testimony to one submission. The
/// null separators prevent collisions between adjacent fields.
fn derive_submission_id(cfg: &SubmissionConfig, name: &str, trip: &str, narrative: &str) -> Uuid {
    let mut material = Vec::with_capacity(name.len() + trip.len() + narrative.len() + 2);
    material.extend_from_slice(name.as_bytes());
    material.push(0);
    material.extend_from_slice(trip.as_bytes());
    material.push(0);
    material.extend_from_slice(narrative.as_bytes());
    Uuid::new_v5(&cfg.submission_id_namespace, &material)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_narrative() -> String {
        "Caminar hacia Santiago me cambió la vida. Cada etapa del camino fue un regalo de fe y \
         de encuentro con otros peregrinos."
            .to_string()
    }

    fn valid_raw() -> RawSubmission {
        RawSubmission {
            name: Some("María Fernanda".into()),
            trip: Some("Camino de Santiago (Galicia) 2024".into()),
            testimony: Some(long_narrative()),
            email: Some("maria@example.com".into()),
            language: Some("es".into()),
            consent: Some(true),
            ..Default::default()
        }
    }

    fn field_error(result: Result<Submission, ValidationFailure>, key: &str) -> String {
        match result {
            Err(ValidationFailure::Invalid { errors }) => errors
                .get(key)
                .unwrap_or_else(|| panic!("expected error for field {key}, got {errors:?}"))
                .clone(),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_success() {
        let submission =
            validate(valid_raw(), &SubmissionConfig::default()).expect("validation should pass");
        assert_eq!(submission.name, "María Fernanda");
        assert_eq!(submission.trip, "Camino de Santiago (Galicia) 2024");
        assert_eq!(submission.language, Language::Es);
        assert_eq!(submission.email.as_deref(), Some("maria@example.com"));
        assert!(!submission.id.is_nil());
        assert!(!submission.has_media());
    }

    #[test]
    fn test_alias_fields_deserialize() {
        let raw: RawSubmission = serde_json::from_value(serde_json::json!({
            "nombre": "Juan",
            "viaje": "Tierra Santa 2024",
            "testimonio": "texto",
            "correo": "juan@example.com",
            "idioma": "es",
            "website": ""
        }))
        .expect("payload should deserialize");

        assert_eq!(raw.name.as_deref(), Some("Juan"));
        assert_eq!(raw.trip.as_deref(), Some("Tierra Santa 2024"));
        assert_eq!(raw.testimony.as_deref(), Some("texto"));
        assert_eq!(raw.email.as_deref(), Some("juan@example.com"));
        assert_eq!(raw.language.as_deref(), Some("es"));
        assert_eq!(raw.honeypot.as_deref(), Some(""));
    }

    #[test]
    fn test_honeypot_rejects_silently() {
        let raw = RawSubmission {
            honeypot: Some("https://spam.example".into()),
            ..valid_raw()
        };
        assert_eq!(
            validate(raw, &SubmissionConfig::default()),
            Err(ValidationFailure::Honeypot)
        );
    }

    #[test]
    fn test_honeypot_whitespace_is_not_a_hit() {
        let raw = RawSubmission {
            honeypot: Some("   ".into()),
            ..valid_raw()
        };
        assert!(validate(raw, &SubmissionConfig::default()).is_ok());
    }

    #[test]
    fn test_name_bounds() {
        let cfg = SubmissionConfig::default();

        let too_short = RawSubmission {
            name: Some("M".into()),
            ..valid_raw()
        };
        assert!(field_error(validate(too_short, &cfg), "name").contains("entre 2 y 100"));

        let at_max = RawSubmission {
            name: Some("x".repeat(100)),
            ..valid_raw()
        };
        assert!(validate(at_max, &cfg).is_ok());

        let over_max = RawSubmission {
            name: Some("x".repeat(101)),
            ..valid_raw()
        };
        assert!(matches!(
            validate(over_max, &cfg),
            Err(ValidationFailure::Invalid { .. })
        ));
    }

    #[test]
    fn test_narrative_bounds() {
        let cfg = SubmissionConfig::default();

        for (len, ok) in [(49, false), (50, true), (2000, true), (2001, false)] {
            let raw = RawSubmission {
                testimony: Some("x".repeat(len)),
                ..valid_raw()
            };
            assert_eq!(validate(raw, &cfg).is_ok(), ok, "narrative length {len}");
        }
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let raw = RawSubmission {
            name: Some(" \t ".into()),
            ..valid_raw()
        };
        let message = field_error(validate(raw, &SubmissionConfig::default()), "name");
        assert_eq!(message, "El nombre es obligatorio");
    }

    #[test]
    fn test_missing_language_reports_in_english() {
        let raw = RawSubmission {
            language: None,
            ..valid_raw()
        };
        let message = field_error(validate(raw, &SubmissionConfig::default()), "language");
        assert_eq!(message, "Language is required");
    }

    #[test]
    fn test_unsupported_language_rejected() {
        let raw = RawSubmission {
            language: Some("fr".into()),
            ..valid_raw()
        };
        let message = field_error(validate(raw, &SubmissionConfig::default()), "language");
        assert!(message.contains("\"en\" or \"es\""));
    }

    #[test]
    fn test_email_shapes() {
        let cfg = SubmissionConfig::default();

        for bad in ["not-an-email", "a@b", "a @b.co", "a@@b.co"] {
            let raw = RawSubmission {
                email: Some(bad.into()),
                ..valid_raw()
            };
            assert!(
                matches!(validate(raw, &cfg), Err(ValidationFailure::Invalid { errors }) if errors.contains_key("email")),
                "email {bad:?} should be rejected"
            );
        }

        let raw = RawSubmission {
            email: None,
            ..valid_raw()
        };
        let submission = validate(raw, &cfg).expect("email is optional");
        assert!(submission.email.is_none());
    }

    #[test]
    fn test_consent_required() {
        let cfg = SubmissionConfig::default();

        for consent in [None, Some(false)] {
            let raw = RawSubmission {
                consent,
                ..valid_raw()
            };
            let message = field_error(validate(raw, &cfg), "consent");
            assert!(message.contains("consentimiento"));
        }

        let relaxed = SubmissionConfig {
            require_consent: false,
            ..Default::default()
        };
        let raw = RawSubmission {
            consent: None,
            ..valid_raw()
        };
        assert!(validate(raw, &relaxed).is_ok());
    }

    #[test]
    fn test_media_format_rejected() {
        let raw = RawSubmission {
            media: vec![MediaFile {
                data: "AAAA".into(),
                mime_type: "application/pdf".into(),
                ..Default::default()
            }],
            ..valid_raw()
        };
        let message = field_error(validate(raw, &SubmissionConfig::default()), "media[0]");
        assert!(message.contains("Formato"));
    }

    #[test]
    fn test_media_size_cap_enforced() {
        let cfg = SubmissionConfig {
            max_image_bytes: 16,
            ..Default::default()
        };
        let raw = RawSubmission {
            media: vec![MediaFile {
                data: "A".repeat(100),
                mime_type: "image/png".into(),
                ..Default::default()
            }],
            ..valid_raw()
        };
        let message = field_error(validate(raw, &cfg), "media[0]");
        assert!(message.contains("demasiado grande"));
    }

    #[test]
    fn test_audio_rides_its_own_cap() {
        let cfg = SubmissionConfig {
            max_audio_bytes: 8,
            ..Default::default()
        };
        let raw = RawSubmission {
            media: vec![MediaFile {
                data: "A".repeat(64),
                mime_type: "audio/mpeg".into(),
                ..Default::default()
            }],
            ..valid_raw()
        };
        let message = field_error(validate(raw, &cfg), "media[0]");
        assert!(message.contains("audio"));
    }

    #[test]
    fn test_legacy_photo_merged_into_media() {
        let raw = RawSubmission {
            photo: Some(MediaFile {
                data: "AAAA".into(),
                mime_type: "IMAGE/JPEG".into(),
                ..Default::default()
            }),
            ..valid_raw()
        };
        let submission =
            validate(raw, &SubmissionConfig::default()).expect("legacy photo should validate");
        assert_eq!(submission.media.len(), 1);
        // MIME is normalized on the way through.
        assert_eq!(submission.media[0].mime_type, "image/jpeg");
    }

    #[test]
    fn test_submission_id_deterministic() {
        let cfg = SubmissionConfig::default();
        let first = validate(valid_raw(), &cfg).expect("first validation");
        let second = validate(valid_raw(), &cfg).expect("second validation");
        assert_eq!(first.id, second.id);

        let other = RawSubmission {
            name: Some("Otro Peregrino".into()),
            ..valid_raw()
        };
        let third = validate(other, &cfg).expect("third validation");
        assert_ne!(first.id, third.id);
    }

    #[test]
    fn test_control_chars_stripped() {
        let raw = RawSubmission {
            name: Some("Mar\u{0007}ía".into()),
            testimony: Some(format!("line one\r\n{}", long_narrative())),
            ..valid_raw()
        };
        let submission = validate(raw, &SubmissionConfig::default()).expect("should validate");
        assert_eq!(submission.name, "María");
        assert!(submission.narrative.starts_with("line one\n"));
        assert!(!submission.narrative.contains('\r'));
    }

    #[test]
    fn test_all_errors_collected_at_once() {
        let raw = RawSubmission {
            name: None,
            trip: Some("x".into()),
            testimony: Some("short".into()),
            email: Some("bad".into()),
            language: Some("es".into()),
            consent: None,
            ..Default::default()
        };
        match validate(raw, &SubmissionConfig::default()) {
            Err(ValidationFailure::Invalid { errors }) => {
                for key in ["name", "trip", "testimony", "email", "consent"] {
                    assert!(errors.contains_key(key), "missing error for {key}");
                }
            }
            other => panic!("expected field errors, got {other:?}"),
        }
    }
}
