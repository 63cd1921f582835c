use super::*;

fn policy() -> EmailPolicy {
    EmailPolicy { institution_domain: "pec.edu.in".to_owned(), allowed_emails: vec!["admin@example.com".to_owned()] }
}

#[test]
fn normalize_email_accepts_basic_address() {
    assert_eq!(normalize_email("  Student@PEC.edu.in "), Some("student@pec.edu.in".to_owned()));
}

#[test]
fn normalize_email_rejects_invalid_values() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("student"), None);
    assert_eq!(normalize_email("@pec.edu.in"), None);
    assert_eq!(normalize_email("student@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn institutional_addresses_are_allowed() {
    assert!(is_signup_allowed("student@pec.edu.in", &policy()));
    assert!(is_signup_allowed("STUDENT@pec.edu.in", &policy()));
}

#[test]
fn lookalike_domains_are_rejected() {
    assert!(!is_signup_allowed("student@gmail.com", &policy()));
    assert!(!is_signup_allowed("student@notpec.edu.in", &policy()));
    assert!(!is_signup_allowed("pec.edu.in", &policy()));
}

#[test]
fn whitelisted_address_is_allowed() {
    assert!(is_signup_allowed("Admin@Example.com", &policy()));
    assert!(!is_signup_allowed("other@example.com", &policy()));
}

#[test]
fn rejection_message_names_domain() {
    assert_eq!(
        signup_rejection_message(&policy()),
        "Please use a valid institutional email address (@pec.edu.in)"
    );
}
