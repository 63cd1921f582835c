use std::sync::Mutex;

use serde_json::json;

use super::*;
use crate::net::mock::MockTransport;
use crate::net::transport::Transport;
use crate::storage::{MemoryStorage, Storage, TokenStore};

fn policy() -> EmailPolicy {
    EmailPolicy { institution_domain: "pec.edu.in".to_owned(), allowed_emails: Vec::new() }
}

fn store_with(mock: &Arc<MockTransport>, storage: &MemoryStorage) -> Arc<SessionStore> {
    let transport: Arc<dyn Transport> = mock.clone();
    let api = ApiClient::new(transport, "", TokenStore::new(Arc::new(storage.clone()), "token"));
    SessionStore::new(api, policy())
}

fn asha() -> serde_json::Value {
    json!({ "name": "Asha", "email": "asha@pec.edu.in", "role": "STUDENT" })
}

// =============================================================
// initialize
// =============================================================

#[tokio::test]
async fn starts_loading_until_initialized() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    assert!(store.snapshot().loading);

    store.initialize().await;

    let session = store.snapshot();
    assert!(!session.loading);
    assert!(!session.is_authenticated());
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn initialize_restores_user_from_stored_token() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "abc");
    let store = store_with(&mock, &storage);
    mock.push_json(200, asha());

    store.initialize().await;

    let session = store.snapshot();
    assert!(!session.loading);
    assert_eq!(session.token.as_deref(), Some("abc"));
    assert_eq!(session.current_user.map(|u| u.name), Some("Asha".to_owned()));
}

#[tokio::test]
async fn initialize_with_rejected_token_clears_everything() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "stale");
    let store = store_with(&mock, &storage);
    mock.push_text(401, "");

    store.initialize().await;

    let session = store.snapshot();
    assert!(!session.loading);
    assert_eq!(session.token, None);
    assert_eq!(session.current_user, None);
    assert_eq!(storage.get("token"), None);
}

#[tokio::test]
async fn initialize_keeps_token_on_network_failure() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "abc");
    let store = store_with(&mock, &storage);
    mock.push_unreachable();

    store.initialize().await;

    let session = store.snapshot();
    assert!(!session.loading);
    assert!(session.is_authenticated());
    assert_eq!(session.current_user, None);
    assert_eq!(storage.get("token").as_deref(), Some("abc"));
}

// =============================================================
// login / logout
// =============================================================

#[tokio::test]
async fn login_persists_token_and_authenticates() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    store.initialize().await;
    mock.push_json(200, json!({ "token": "abc" }));
    mock.push_json(200, asha());

    let user = store.login("asha@pec.edu.in", "pw").await.unwrap();

    assert_eq!(storage.get("token").as_deref(), Some("abc"));
    assert!(store.is_authenticated());
    assert_eq!(user.map(|u| u.email), Some("asha@pec.edu.in".to_owned()));
    assert_eq!(store.snapshot().error, None);
}

#[tokio::test]
async fn login_uses_embedded_user_without_profile_call() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    mock.push_json(200, json!({ "token": "abc", "user": { "name": "Root", "email": "root@pec.edu.in", "role": "ADMIN" } }));

    store.login("root@pec.edu.in", "pw").await.unwrap();

    assert_eq!(mock.request_count(), 1);
    assert!(store.is_admin());
}

#[tokio::test]
async fn login_stays_authenticated_when_profile_fetch_fails() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    mock.push_text(200, "raw-token");
    mock.push_text(500, "");

    let user = store.login("asha@pec.edu.in", "pw").await.unwrap();

    assert_eq!(user, None);
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn login_blank_fields_skip_network() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);

    let err = store.login("  ", "pw").await.unwrap_err();

    assert_eq!(err, PortalError::validation("Please fill in all fields"));
    assert_eq!(mock.request_count(), 0);
    assert_eq!(store.snapshot().error, None);
}

#[tokio::test]
async fn login_rejection_records_error() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    mock.push_text(401, "Invalid email or password");

    let err = store.login("asha@pec.edu.in", "bad").await.unwrap_err();

    assert!(matches!(err, PortalError::InvalidCredentials(_)));
    assert!(!store.is_authenticated());
    assert_eq!(store.snapshot().error.as_deref(), Some("Invalid email or password"));
}

#[tokio::test]
async fn logout_is_idempotent() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    mock.push_json(200, json!({ "token": "abc", "user": asha() }));
    store.login("asha@pec.edu.in", "pw").await.unwrap();

    assert!(store.logout());
    assert!(!store.logout());
    assert!(!store.logout());

    let session = store.snapshot();
    assert_eq!(session.token, None);
    assert_eq!(session.current_user, None);
    assert_eq!(storage.get("token"), None);
}

#[tokio::test]
async fn authenticated_401_clears_session() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "abc");
    let store = store_with(&mock, &storage);
    mock.push_json(200, asha());
    store.initialize().await;
    mock.push_text(401, "");

    let err = store.api().list_courses().await.unwrap_err();

    assert!(err.is_unauthorized());
    let session = store.snapshot();
    assert_eq!(session.token, None);
    assert_eq!(session.current_user, None);
}

// =============================================================
// signup / otp
// =============================================================

#[tokio::test]
async fn signup_rejects_non_institutional_email_locally() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);

    let err = store.signup("A", "someone@gmail.com", "x").await.unwrap_err();

    assert_eq!(err, PortalError::validation("Please use a valid institutional email address (@pec.edu.in)"));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn signup_and_verify_do_not_authenticate() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    mock.push_text(200, "OTP sent");
    mock.push_text(200, "Email verified");

    store.signup("A", "Student@PEC.edu.in", "x").await.unwrap();
    store.verify_otp("student@pec.edu.in", "1234").await.unwrap();

    assert!(!store.is_authenticated());
    assert_eq!(storage.get("token"), None);
    let signup = &mock.requests()[0];
    assert_eq!(
        signup.body,
        crate::net::transport::RequestBody::Json(json!({ "name": "A", "email": "student@pec.edu.in", "password": "x" }))
    );
}

#[tokio::test]
async fn reset_password_without_token_skips_network() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);

    let err = store.reset_password("a@pec.edu.in", &ResetToken::new(""), "new").await.unwrap_err();

    assert!(matches!(err, PortalError::Validation(_)));
    assert_eq!(mock.request_count(), 0);
}

// =============================================================
// listeners / teardown
// =============================================================

#[tokio::test]
async fn listeners_receive_events_in_order() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    store.subscribe(Arc::new(move |event, session: &Session| {
        sink.lock().unwrap().push((event, session.is_authenticated()));
    }));

    store.initialize().await;
    mock.push_json(200, json!({ "token": "abc", "user": asha() }));
    store.login("asha@pec.edu.in", "pw").await.unwrap();
    store.logout();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (SessionEvent::Initialized, false),
            (SessionEvent::LoggedIn, true),
            (SessionEvent::LoggedOut, false),
        ]
    );
}

#[tokio::test]
async fn unsubscribed_listener_is_silent() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    let count = Arc::new(AtomicU64::new(0));
    let sink = count.clone();
    let id = store.subscribe(Arc::new(move |_, _: &Session| {
        sink.fetch_add(1, Ordering::SeqCst);
    }));
    store.unsubscribe(id);

    store.initialize().await;

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn teardown_discards_late_profile() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "abc");
    let store = store_with(&mock, &storage);
    mock.push_json(200, asha());

    let init = store.initialize();
    let teardown = async {
        store.teardown();
    };
    tokio::join!(init, teardown);

    assert_eq!(store.snapshot().current_user, None);
}

#[tokio::test]
async fn logout_during_restore_stays_logged_out() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "abc");
    let store = store_with(&mock, &storage);
    mock.push_json(200, asha());

    let (_, cleared) = tokio::join!(store.initialize(), async { store.logout() });

    assert!(cleared);
    let session = store.snapshot();
    assert!(!session.loading);
    assert_eq!(session.token, None);
    assert_eq!(session.current_user, None);
    assert_eq!(storage.get("token"), None);
}

#[tokio::test]
async fn logout_during_profile_refresh_stays_logged_out() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    store.initialize().await;
    mock.push_json(200, json!({ "token": "abc", "user": asha() }));
    store.login("asha@pec.edu.in", "pw").await.unwrap();
    mock.push_json(200, asha());

    let (refreshed, _) = tokio::join!(store.refresh_profile(), async { store.logout() });

    assert_eq!(refreshed.unwrap().name, "Asha");
    let session = store.snapshot();
    assert_eq!(session.token, None);
    assert_eq!(session.current_user, None);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn refresh_after_relogin_still_applies() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let store = store_with(&mock, &storage);
    store.initialize().await;
    mock.push_json(200, json!({ "token": "abc", "user": asha() }));
    store.login("asha@pec.edu.in", "pw").await.unwrap();
    store.logout();
    mock.push_json(200, json!({ "token": "def", "user": asha() }));
    store.login("asha@pec.edu.in", "pw").await.unwrap();
    mock.push_json(200, json!({ "name": "Asha R", "email": "asha@pec.edu.in", "role": "STUDENT" }));

    store.refresh_profile().await.unwrap();

    assert_eq!(store.current_user().map(|u| u.name), Some("Asha R".to_owned()));
}
