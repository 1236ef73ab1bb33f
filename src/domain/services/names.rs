//! Name sanitizing shared by the directory lookup, the party resolver and the writer.

/// Given names are a single token: all whitespace is removed.
pub fn sanitize_first_name(raw: &str) -> String {
    raw.split_whitespace().collect()
}

/// Surnames may hold one internal space ("De Luca"). Whitespace runs collapse to a single
/// space and anything past the second token is glued onto it.
pub fn sanitize_last_name(raw: &str) -> String {
    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next()) {
        (None, _) => String::new(),
        (Some(first), None) => first.to_string(),
        (Some(first), Some(second)) => {
            let tail: String = parts.collect();
            format!("{} {}{}", first, second, tail)
        }
    }
}

/// Lowercased "first last", used for case-insensitive membership checks.
pub fn name_key(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name).to_lowercase()
}

/// Optional free-text field: trimmed, empty becomes `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
