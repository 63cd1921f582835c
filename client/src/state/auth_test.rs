use portal::net::types::Role;

use super::*;

fn user(name: &str, role: Role) -> User {
    User {
        name: name.to_owned(),
        email: "asha@pec.edu.in".to_owned(),
        role,
        department: None,
        batch_year: None,
        current_semester: None,
    }
}

#[test]
fn mirrors_session_without_token() {
    let session = Session {
        current_user: Some(user("Asha", Role::Student)),
        token: Some("abc".to_owned()),
        loading: false,
        error: None,
    };
    let state = AuthState::from_session(&session);
    assert!(state.authenticated);
    assert!(!state.loading);
    assert!(!state.is_admin());
    assert!(!format!("{state:?}").contains("abc"));
}

#[test]
fn default_is_logged_out() {
    let state = AuthState::default();
    assert!(!state.authenticated);
    assert_eq!(state.display_name(), "Student");
}

#[test]
fn display_name_falls_back_to_email() {
    let state = AuthState { user: Some(user(" ", Role::Admin)), ..AuthState::default() };
    assert_eq!(state.display_name(), "asha");
    assert!(state.is_admin());
}
