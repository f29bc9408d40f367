use email_firstname::*;
use serde_json::json;

// --- EmailAddress ---

#[test]
fn test_email_address_parse_plain() {
    let addr = EmailAddress::parse("alice@company.org").unwrap();
    assert_eq!(addr.address, "alice@company.org");
    assert_eq!(addr.domain, "company.org");
    assert_eq!(addr.local_part, "alice");
    assert!(addr.display_name.is_none());
}

#[test]
fn test_email_address_parse_mailbox() {
    let addr = EmailAddress::parse("\"Anna Rossi\" <anna.rossi@example.com>").unwrap();
    assert_eq!(addr.address, "anna.rossi@example.com");
    assert_eq!(addr.local_part, "anna.rossi");
    assert_eq!(addr.display_name.as_deref(), Some("Anna Rossi"));
    assert_eq!(addr.to_string(), "Anna Rossi <anna.rossi@example.com>");
}

#[test]
fn test_email_address_parse_angle_no_name() {
    let addr = EmailAddress::parse("<bob@test.io>").unwrap();
    assert_eq!(addr.address, "bob@test.io");
    assert!(addr.display_name.is_none());
}

#[test]
fn test_email_address_parse_invalid() {
    assert!(EmailAddress::parse("not-an-email").is_none());
    assert!(EmailAddress::parse("").is_none());
    assert!(EmailAddress::parse("@example.com").is_none());
}

#[test]
fn test_email_address_is_valid() {
    assert!(EmailAddress::is_valid("mario@example.com"));
    assert!(!EmailAddress::is_valid("undefined"));
    assert!(!EmailAddress::is_valid("   "));
    assert!(!EmailAddress::is_valid("mario"));
}

// --- Contact ---

#[test]
fn test_contact_first_name() {
    let contact = Contact::new("a@b.it").with_first_name("Anna");
    assert_eq!(contact.first_name(), Some("Anna"));
    assert!(contact.has_first_name());
}

#[test]
fn test_contact_blank_first_name_is_unset() {
    let contact = Contact::new("a@b.it").with_first_name("   ");
    assert_eq!(contact.first_name(), None);
    assert!(!Contact::new("a@b.it").has_first_name());
}

#[test]
fn test_contact_non_string_first_name_is_unset() {
    let contact: Contact = serde_json::from_value(json!({
        "email": "a@b.it",
        "attributes": { "FIRSTNAME": 42 }
    }))
    .unwrap();
    assert!(!contact.has_first_name());
}

#[test]
fn test_contact_deserialize_crm_payload() {
    let contact: Contact = serde_json::from_value(json!({
        "id": 17,
        "email": "giulia@example.com",
        "emailBlacklisted": false,
        "attributes": { "FIRSTNAME": "Giulia", "LASTNAME": "Bianchi" },
        "listIds": [3]
    }))
    .unwrap();
    assert_eq!(contact.email, "giulia@example.com");
    assert_eq!(contact.first_name(), Some("Giulia"));
    assert_eq!(contact.attributes["LASTNAME"], "Bianchi");
}

// --- Outcome ---

#[test]
fn test_outcome_status() {
    let cases = [
        (Outcome::Updated { name: "Anna".into() }, Status::Updated),
        (Outcome::AlreadySet { existing: "Anna".into() }, Status::Skipped),
        (Outcome::Skipped { reason: "no name extracted".into() }, Status::Skipped),
        (Outcome::NotFound, Status::Skipped),
        (
            Outcome::Failed {
                message: "boom".into(),
                rate_limited: false,
            },
            Status::Error,
        ),
    ];

    for (outcome, expected) in cases {
        assert_eq!(outcome.status(), expected, "for {outcome:?}");
    }
}

#[test]
fn test_outcome_message_and_name() {
    let updated = Outcome::Updated { name: "Anna".into() };
    assert_eq!(updated.name(), Some("Anna"));

    let already = Outcome::AlreadySet { existing: "Gio".into() };
    assert_eq!(already.message(), "first name already set (Gio)");
    assert_eq!(already.name(), None);

    assert_eq!(Outcome::NotFound.message(), "contact not found");
}

#[test]
fn test_outcome_rate_limited() {
    let failed = Outcome::Failed {
        message: "429".into(),
        rate_limited: true,
    };
    assert!(failed.is_rate_limited());
    assert!(!Outcome::NotFound.is_rate_limited());
}

#[test]
fn test_status_display() {
    assert_eq!(Status::Updated.to_string(), "updated");
    assert_eq!(Status::Skipped.to_string(), "skipped");
    assert_eq!(Status::Error.to_string(), "error");
    assert_eq!(serde_json::to_value(Status::Error).unwrap(), json!("error"));
}
