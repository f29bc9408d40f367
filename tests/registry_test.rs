use email_firstname::*;
use std::io::Write;

// --- Membership ---

#[test]
fn test_contains_is_case_insensitive_and_trimmed() {
    let registry = NameRegistry::from_names(["Federica", "  catia "]);
    assert!(registry.contains("federica"));
    assert!(registry.contains("FEDERICA"));
    assert!(registry.contains(" Catia\n"));
    assert!(!registry.contains("federic"));
    assert!(!registry.contains(""));
}

#[test]
fn test_from_names_drops_blanks() {
    let registry = NameRegistry::from_names(["mario", "", "   ", "MARIO"]);
    assert_eq!(registry.len(), 1);
    assert!(!registry.is_empty());
}

#[test]
fn test_fallback_names() {
    let registry = NameRegistry::fallback();
    assert!(registry.len() >= 90);
    assert!(registry.contains("catia"));
    assert!(registry.contains("federica"));
    assert_eq!(registry.len(), FALLBACK_NAMES.len());
}

#[test]
fn test_bundled_covers_fallback() {
    let bundled = NameRegistry::bundled();
    assert!(bundled.len() > FALLBACK_NAMES.len());
    for name in FALLBACK_NAMES {
        assert!(bundled.contains(name), "missing {name}");
    }
    assert!(bundled.contains("rosanna"));
}

// --- Diminutives ---

#[test]
fn test_resolve_diminutive() {
    let registry = NameRegistry::fallback();
    assert_eq!(registry.resolve_diminutive("Fede "), Some("federica"));
    assert_eq!(registry.resolve_diminutive("giò"), Some("giovanni"));
    assert!(registry.is_diminutive("TONY"));
    assert!(!registry.is_diminutive("federica"));
    assert_eq!(registry.resolve_diminutive(""), None);
}

#[test]
fn test_diminutive_target_not_validated() {
    let registry = NameRegistry::fallback();
    assert!(!registry.contains("stefania"));
    assert_eq!(registry.resolve_diminutive("stefy"), Some("stefania"));
}

#[test]
fn test_with_diminutives_replaces_table() {
    let registry = NameRegistry::from_names(["beatrice"]).with_diminutives([("Bice", "Beatrice")]);
    assert_eq!(registry.resolve_diminutive("bice"), Some("beatrice"));
    assert!(!registry.is_diminutive("bea"));
}

// --- Loading ---

#[test]
fn test_load_corpus_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Rosanna\n\n  Federica  \nCATIA").unwrap();

    let load = NameRegistry::load(file.path());
    assert!(!load.used_fallback);
    assert_eq!(load.registry.len(), 3);
    assert!(load.registry.contains("rosanna"));
    assert!(!load.registry.contains("mario"));
}

#[test]
fn test_load_missing_file_uses_fallback() {
    let dir = tempfile::TempDir::new().unwrap();
    let load = NameRegistry::load(dir.path().join("missing.txt"));
    assert!(load.used_fallback);
    assert_eq!(load.registry.len(), FALLBACK_NAMES.len());
}

#[test]
fn test_load_empty_file_uses_fallback() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let load = NameRegistry::load(file.path());
    assert!(load.used_fallback);
    assert!(load.registry.contains("mario"));
}

#[test]
fn test_parse_corpus() {
    let registry = NameRegistry::parse_corpus("anna\r\nmarco\n");
    assert!(registry.contains("anna"));
    assert!(registry.contains("marco"));
    assert_eq!(registry.len(), 2);
}
