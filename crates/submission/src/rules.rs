//! Field-level sanitization and pattern checks.
//!
//! These helpers are shared between the testimony validator and the lead
//! form validator, which enforce the same email and phone shapes.

/// Sanitizes a single-line field: strips control characters (including
/// newlines) when enabled, trims, and collapses empty results to `None`.
pub fn sanitize_line(value: Option<String>, strip_control: bool) -> Option<String> {
    value.and_then(|raw| {
        let filtered = if strip_control {
            raw.chars().filter(|c| !c.is_control()).collect::<String>()
        } else {
            raw
        };
        let trimmed = filtered.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

/// Sanitizes a multi-line field: strips control characters except `\n`
/// when enabled, trims, and collapses empty results to `None`.
///
/// Carriage returns are always dropped so narratives are `\n`-separated
/// regardless of the submitting platform.
pub fn sanitize_block(value: Option<String>, strip_control: bool) -> Option<String> {
    value.and_then(|raw| {
        let filtered: String = raw
            .chars()
            .filter(|c| match c {
                '\n' => true,
                '\r' => false,
                c if strip_control => !c.is_control(),
                _ => true,
            })
            .collect();
        let trimmed = filtered.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

/// Length in Unicode scalar values, matching how the form counts input.
pub fn char_length(value: &str) -> usize {
    value.chars().count()
}

/// Permissive email shape check: one `@`, no whitespace, and a dotted
/// domain with non-empty labels around the final dot.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Phone shape check: after removing `(` `)` `-` and whitespace, the
/// value must be an optional `+` followed by 7 to 15 digits.
pub fn is_valid_phone(value: &str) -> bool {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '-') && !c.is_whitespace())
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}
