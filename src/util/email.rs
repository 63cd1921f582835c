//! Signup email policy.
//!
//! Only institutional addresses (or explicitly whitelisted ones) may start a
//! signup. The check runs before any network call.

#[cfg(test)]
#[path = "email_test.rs"]
mod email_test;

use crate::config::EmailPolicy;

/// Trim and lowercase an address, rejecting anything without exactly one `@`
/// separating non-empty parts.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let mut parts = normalized.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(normalized)
}

/// Whether `email` may sign up under `policy`.
#[must_use]
pub fn is_signup_allowed(email: &str, policy: &EmailPolicy) -> bool {
    let Some(normalized) = normalize_email(email) else {
        return false;
    };
    if policy.allowed_emails.iter().any(|allowed| allowed == &normalized) {
        return true;
    }
    let suffix = format!("@{}", policy.institution_domain);
    normalized.ends_with(&suffix)
}

/// Message shown when [`is_signup_allowed`] fails.
#[must_use]
pub fn signup_rejection_message(policy: &EmailPolicy) -> String {
    format!("Please use a valid institutional email address (@{})", policy.institution_domain)
}
