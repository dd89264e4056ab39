//! Quote escaping for header values.

/// Escapes a value for use inside a double-quoted header scalar.
///
/// Backslashes are doubled before quotes are escaped so the two rules
/// cannot interfere. Newlines and carriage returns become spaces because
/// header values are single-line.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' | '\r' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}
