//! Display formatting for matched name fragments

/// Render a raw name fragment in display case.
///
/// Returns `None` for fragments that cannot be a name: empty, purely
/// numeric, or a single character.
///
/// ```rust
/// use email_firstname::capitalize;
///
/// assert_eq!(capitalize("federica").as_deref(), Some("Federica"));
/// assert_eq!(capitalize("d'amico").as_deref(), Some("D'Amico"));
/// assert_eq!(capitalize("anna maria").as_deref(), Some("Anna Maria"));
/// assert_eq!(capitalize("42"), None);
/// ```
#[must_use]
pub fn capitalize(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.chars().all(|c| c.is_ascii_digit()) || raw.chars().count() < 2 {
        return None;
    }

    if let Some((head, tail)) = raw.split_once('\'') {
        return Some(format!("{}'{}", capitalize_word(head), capitalize_word(tail)));
    }

    if raw.contains(' ') {
        let joined = raw
            .split_whitespace()
            .map(capitalize_word)
            .collect::<Vec<_>>()
            .join(" ");
        return (!joined.is_empty()).then_some(joined);
    }

    Some(capitalize_word(raw))
}

/// First char upper, remainder lower
fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_word_unicode() {
        assert_eq!(capitalize_word("nicolò"), "Nicolò");
        assert_eq!(capitalize_word(""), "");
    }

    #[test]
    fn test_apostrophe_splits_once() {
        assert_eq!(capitalize("d'a'b").as_deref(), Some("D'A'b"));
    }

    #[test]
    fn test_whitespace_only_rejected() {
        assert_eq!(capitalize("   "), None);
    }
}
