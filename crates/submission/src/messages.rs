//! Localized validation messages.
//!
//! Two message tables, English and Spanish, keyed by the declared
//! submission language. Messages are user-facing and rendered verbatim by
//! the form, so wording stays close to what the site has always shown.

use crate::types::{Language, MediaKind};

/// Free-text fields with localized labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Name,
    Trip,
    Narrative,
    Language,
}

impl Field {
    fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Field::Name, Language::En) => "Name",
            (Field::Name, Language::Es) => "El nombre",
            (Field::Trip, Language::En) => "Trip information",
            (Field::Trip, Language::Es) => "La información del viaje",
            (Field::Narrative, Language::En) => "Testimony",
            (Field::Narrative, Language::Es) => "El testimonio",
            (Field::Language, Language::En) => "Language",
            (Field::Language, Language::Es) => "El idioma",
        }
    }
}

pub(crate) fn required(lang: Language, field: Field) -> String {
    match lang {
        Language::En => format!("{} is required", field.label(lang)),
        // "información" is feminine, the other field labels are masculine.
        Language::Es => match field {
            Field::Trip => "La información del viaje es obligatoria".to_string(),
            _ => format!("{} es obligatorio", field.label(lang)),
        },
    }
}

pub(crate) fn length(lang: Language, field: Field, min: usize, max: usize) -> String {
    match lang {
        Language::En => format!(
            "{} must be between {min} and {max} characters",
            field.label(lang)
        ),
        Language::Es => format!(
            "{} debe tener entre {min} y {max} caracteres",
            field.label(lang)
        ),
    }
}

pub(crate) fn unsupported_language(lang: Language) -> String {
    match lang {
        Language::En => "Language must be \"en\" or \"es\"".to_string(),
        Language::Es => "El idioma debe ser \"en\" o \"es\"".to_string(),
    }
}

pub(crate) fn invalid_email(lang: Language) -> String {
    match lang {
        Language::En => "Please enter a valid email address".to_string(),
        Language::Es => "Ingresa un correo electrónico válido".to_string(),
    }
}

pub(crate) fn consent_required(lang: Language) -> String {
    match lang {
        Language::En => "Consent is required to publish your testimony".to_string(),
        Language::Es => "Se requiere tu consentimiento para publicar tu testimonio".to_string(),
    }
}

pub(crate) fn media_format(lang: Language) -> String {
    match lang {
        Language::En => {
            "Invalid file format. Only JPG, PNG, GIF, WebP, MP4, WebM, MP3, WAV, OGG allowed"
                .to_string()
        }
        Language::Es => {
            "Formato de archivo no válido. Solo se permiten JPG, PNG, GIF, WebP, MP4, WebM, MP3, \
             WAV, OGG"
                .to_string()
        }
    }
}

pub(crate) fn media_too_large(lang: Language, kind: MediaKind, cap_bytes: u64) -> String {
    let cap_mb = cap_bytes / (1024 * 1024);
    match (lang, kind) {
        (Language::En, MediaKind::Image) => {
            format!("Image too large. Maximum size: {cap_mb} MB")
        }
        (Language::En, MediaKind::Video) => {
            format!("Video too large. Maximum size: {cap_mb} MB")
        }
        (Language::En, MediaKind::Audio) => {
            format!("Audio file too large. Maximum size: {cap_mb} MB")
        }
        (Language::Es, MediaKind::Image) => {
            format!("Imagen demasiado grande. Tamaño máximo: {cap_mb} MB")
        }
        (Language::Es, MediaKind::Video) => {
            format!("Video demasiado grande. Tamaño máximo: {cap_mb} MB")
        }
        (Language::Es, MediaKind::Audio) => {
            format!("Archivo de audio demasiado grande. Tamaño máximo: {cap_mb} MB")
        }
    }
}
