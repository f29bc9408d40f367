use email_firstname::capitalize;

#[test]
fn test_capitalize_simple() {
    assert_eq!(capitalize("federica").as_deref(), Some("Federica"));
    assert_eq!(capitalize("mARIO").as_deref(), Some("Mario"));
}

#[test]
fn test_capitalize_apostrophe() {
    assert_eq!(capitalize("d'amico").as_deref(), Some("D'Amico"));
    assert_eq!(capitalize("D'AMICO").as_deref(), Some("D'Amico"));
}

#[test]
fn test_capitalize_multi_word() {
    assert_eq!(capitalize("anna maria").as_deref(), Some("Anna Maria"));
    assert_eq!(capitalize("GIAN  LUCA").as_deref(), Some("Gian Luca"));
}

#[test]
fn test_capitalize_rejects_non_names() {
    assert_eq!(capitalize(""), None);
    assert_eq!(capitalize("a"), None);
    assert_eq!(capitalize("1234"), None);
}

#[test]
fn test_capitalize_keeps_digits_inside_words() {
    assert_eq!(capitalize("mario84").as_deref(), Some("Mario84"));
}

#[test]
fn test_capitalize_is_idempotent() {
    let inputs = [
        "federica",
        "FEDERICA",
        "d'amico",
        "o'NEIL",
        "anna maria",
        "maria  grazia",
        "nicolò",
        "ab",
    ];

    for input in inputs {
        let once = capitalize(input).unwrap();
        assert_eq!(capitalize(&once.to_lowercase()).as_deref(), Some(once.as_str()), "for {input}");
    }
}
