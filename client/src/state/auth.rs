//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors the core session snapshot into a Leptos signal so headers, the
//! dashboard, and the route guard re-render on login, logout, and 401.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use portal::net::types::User;
use portal::state::session::Session;

/// View-side copy of the session; the token itself is never mirrored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub authenticated: bool,
    pub error: Option<String>,
}

impl AuthState {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        Self {
            user: session.current_user.clone(),
            loading: session.loading,
            authenticated: session.is_authenticated(),
            error: session.error.clone(),
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// Name shown in the header; falls back to the email's local part.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.user {
            Some(user) if !user.name.trim().is_empty() => user.name.clone(),
            Some(user) => user.email.split('@').next().unwrap_or_default().to_owned(),
            None => "Student".to_owned(),
        }
    }
}
