//! First-name extraction from email local parts

use crate::capitalize::capitalize;
use crate::registry::NameRegistry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Shortest fragment accepted as a name; shorter ones match too much noise
pub const MIN_NAME_LEN: usize = 5;

/// Longest window tried by the substring scan
pub const MAX_NAME_LEN: usize = 12;

/// Local parts with a known answer, checked before any heuristic
pub const DIRECT_OVERRIDES: &[(&str, &str)] = &[("rosannapa55", "Rosanna"), ("elisa", "Elisa")];

// `x.name...`, e.g. g.catia
static INITIAL_DOT_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^[a-z]\.([a-z]+)").expect("valid regex"));

/// Which rule produced a match
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Exact local part found in [`DIRECT_OVERRIDES`]
    Override,
    /// `name.surname` or `surname.name`
    DottedSegment,
    /// `x.name`
    InitialDot,
    /// Name anchored at the start of the cleaned local part
    Prefix,
    /// Name found anywhere in the cleaned local part
    Substring,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Override => "override",
            Self::DottedSegment => "dotted_segment",
            Self::InitialDot => "initial_dot",
            Self::Prefix => "prefix",
            Self::Substring => "substring",
        };
        f.write_str(label)
    }
}

/// A successful extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Match {
    /// Display-cased first name
    pub name: String,

    pub strategy: Strategy,
}

/// Infers first names from email addresses against a [`NameRegistry`].
///
/// The extractor holds no mutable state; share it by reference or `Arc`
/// across threads.
///
/// ```rust
/// use email_firstname::{Extractor, NameRegistry};
///
/// let extractor = Extractor::new(NameRegistry::from_names(["federica", "catia"]));
///
/// assert_eq!(
///     extractor.extract_first_name("federicamullo@gmail.com").as_deref(),
///     Some("Federica")
/// );
/// assert_eq!(extractor.extract_first_name("g.catia@example.com").as_deref(), Some("Catia"));
/// assert_eq!(extractor.extract_first_name("xyz@example.com"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    registry: NameRegistry,
}

impl Extractor {
    #[must_use]
    pub const fn new(registry: NameRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Display-cased first name for `email`, or `None` when nothing matches.
    ///
    /// Input without an `@` never matches.
    #[must_use]
    pub fn extract_first_name(&self, email: &str) -> Option<String> {
        self.extract(email).map(|m| m.name)
    }

    /// Like [`Self::extract_first_name`], also reporting which rule matched
    #[must_use]
    pub fn extract(&self, email: &str) -> Option<Match> {
        let email = email.trim().to_lowercase();

        let Some((username, _domain)) = email.split_once('@') else {
            debug!(input = %email, "no @ in address, skipping extraction");
            return None;
        };
        if username.is_empty() {
            return None;
        }

        let found = direct_override(username)
            .map(|name| Match {
                name: name.to_string(),
                strategy: Strategy::Override,
            })
            .or_else(|| self.dotted_segment(username))
            .or_else(|| self.initial_dot(username))
            .or_else(|| self.substring_scan(username));

        match &found {
            Some(m) => debug!(username, name = %m.name, strategy = %m.strategy, "first name matched"),
            None => debug!(username, "no first name matched"),
        }

        found
    }

    fn dotted_segment(&self, username: &str) -> Option<Match> {
        if !username.contains('.') {
            return None;
        }

        username
            .split('.')
            .map(strip_digits)
            .find(|segment| self.is_name(segment))
            .and_then(|segment| matched(&segment, Strategy::DottedSegment))
    }

    fn initial_dot(&self, username: &str) -> Option<Match> {
        let captures = INITIAL_DOT_REGEX.captures(username)?;
        let name_part = strip_digits(captures.get(1)?.as_str());

        if self.is_name(&name_part) {
            matched(&name_part, Strategy::InitialDot)
        } else {
            None
        }
    }

    fn substring_scan(&self, username: &str) -> Option<Match> {
        let clean: Vec<char> = username
            .chars()
            .filter(|c| !(c.is_ascii_digit() || matches!(c, '_' | '.' | '-')))
            .collect();

        let len = clean.len();
        if len < MIN_NAME_LEN {
            return None;
        }
        let longest = len.min(MAX_NAME_LEN);
        let window =
            |start: usize, width: usize| -> String { clean[start..start + width].iter().collect() };

        // Names at the start of the username win over names buried inside it.
        if let Some(prefix) = (MIN_NAME_LEN..=longest)
            .rev()
            .map(|width| window(0, width))
            .find(|candidate| self.registry.contains(candidate))
        {
            return matched(&prefix, Strategy::Prefix);
        }

        (MIN_NAME_LEN..=longest)
            .rev()
            .flat_map(|width| (1..=len - width).map(move |start| (start, width)))
            .map(|(start, width)| window(start, width))
            .find(|candidate| self.registry.contains(candidate))
            .and_then(|candidate| matched(&candidate, Strategy::Substring))
    }

    fn is_name(&self, candidate: &str) -> bool {
        candidate.chars().count() >= MIN_NAME_LEN && self.registry.contains(candidate)
    }
}

fn direct_override(username: &str) -> Option<&'static str> {
    DIRECT_OVERRIDES
        .iter()
        .find(|(local, _)| *local == username)
        .map(|(_, name)| *name)
}

fn strip_digits(s: &str) -> String {
    s.chars().filter(|c| !c.is_ascii_digit()).collect()
}

fn matched(raw: &str, strategy: Strategy) -> Option<Match> {
    capitalize(raw).map(|name| Match { name, strategy })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(names: &[&str]) -> Extractor {
        Extractor::new(NameRegistry::from_names(names.iter().copied()))
    }

    #[test]
    fn test_strip_digits() {
        assert_eq!(strip_digits("mario84"), "mario");
        assert_eq!(strip_digits("1234"), "");
    }

    #[test]
    fn test_direct_override_lookup() {
        assert_eq!(direct_override("rosannapa55"), Some("Rosanna"));
        assert_eq!(direct_override("rosannapa"), None);
    }

    #[test]
    fn test_dotted_requires_dot() {
        let ex = extractor(&["mario"]);
        assert!(ex.dotted_segment("mario").is_none());
        assert_eq!(ex.dotted_segment("rossi.mario").unwrap().name, "Mario");
    }

    #[test]
    fn test_initial_dot_rejects_short_names() {
        let ex = extractor(&["rita"]);
        assert!(ex.initial_dot("g.rita").is_none());
    }

    #[test]
    fn test_substring_scan_skips_offset_zero_on_second_pass() {
        let ex = extractor(&["paola"]);
        let m = ex.substring_scan("xxpaolaxx").unwrap();
        assert_eq!(m.name, "Paola");
        assert_eq!(m.strategy, Strategy::Substring);
    }
}
