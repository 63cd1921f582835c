use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::ExposeSecret;
use serde_json::json;

use super::*;
use crate::net::mock::MockTransport;
use crate::storage::{MemoryStorage, Storage};

fn client_with(mock: &Arc<MockTransport>, storage: &MemoryStorage) -> ApiClient {
    let transport: Arc<dyn Transport> = mock.clone();
    ApiClient::new(transport, "https://portal.test/", TokenStore::new(Arc::new(storage.clone()), "token"))
}

// =============================================================
// Message extraction + classification
// =============================================================

#[test]
fn extract_message_handles_json_and_text() {
    assert_eq!(extract_message(r#"{"message":"Email already exists"}"#), "Email already exists");
    assert_eq!(extract_message(r#"{"error":"Bad Request"}"#), "Bad Request");
    assert_eq!(extract_message(r#""Invalid or expired OTP.""#), "Invalid or expired OTP.");
    assert_eq!(extract_message("  Invalid email or password \n"), "Invalid email or password");
    assert_eq!(extract_message(r#"{"status":500}"#), "");
}

#[test]
fn classify_login_rejection_as_invalid_credentials() {
    assert_eq!(
        classify_failure(Endpoint::Login, 400, "Invalid email or password"),
        PortalError::InvalidCredentials("Invalid email or password".to_owned())
    );
    assert_eq!(
        classify_failure(Endpoint::Login, 401, ""),
        PortalError::InvalidCredentials(String::new())
    );
}

#[test]
fn classify_otp_rejection() {
    assert!(matches!(
        classify_failure(Endpoint::VerifyOtp, 400, "Invalid or expired OTP."),
        PortalError::InvalidOrExpiredOtp(_)
    ));
    assert!(matches!(
        classify_failure(Endpoint::VerifyResetOtp, 400, "{}"),
        PortalError::InvalidOrExpiredOtp(_)
    ));
}

#[test]
fn classify_unauthorized_only_for_authenticated_calls() {
    assert_eq!(classify_failure(Endpoint::Authenticated, 401, ""), PortalError::Unauthorized);
    assert!(!classify_failure(Endpoint::Login, 401, "").is_unauthorized());
    assert!(!classify_failure(Endpoint::Signup, 401, "").is_unauthorized());
}

#[test]
fn classify_signup_rejection_as_validation() {
    assert_eq!(
        classify_failure(Endpoint::Signup, 400, "Email already exists"),
        PortalError::Validation("Email already exists".to_owned())
    );
    assert_eq!(
        classify_failure(Endpoint::ForgotPassword, 422, ""),
        PortalError::Validation("Request rejected (422)".to_owned())
    );
}

#[test]
fn classify_server_errors() {
    assert_eq!(classify_failure(Endpoint::Login, 500, "boom"), PortalError::server(Some(500), "boom"));
    assert_eq!(
        classify_failure(Endpoint::Authenticated, 404, r#"{"message":"no such course"}"#),
        PortalError::server(Some(404), "no such course")
    );
}

// =============================================================
// Request construction
// =============================================================

#[tokio::test]
async fn bearer_attached_when_token_stored() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "abc");
    let api = client_with(&mock, &storage);
    mock.push_json(200, json!([]));

    api.list_courses().await.unwrap();

    let req = mock.last_request().unwrap();
    assert_eq!(req.url, "https://portal.test/api/courses/admin/all");
    assert_eq!(req.method, Method::Get);
    assert_eq!(req.bearer.as_ref().map(|t| t.expose_secret().to_owned()), Some("abc".to_owned()));
}

#[tokio::test]
async fn no_bearer_without_token() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);
    mock.push_text(200, "OTP sent to a@pec.edu.in");

    let msg = api.signup("A", "a@pec.edu.in", "x").await.unwrap();

    assert_eq!(msg, "OTP sent to a@pec.edu.in");
    let req = mock.last_request().unwrap();
    assert!(req.bearer.is_none());
    assert_eq!(req.body, RequestBody::Json(json!({ "name": "A", "email": "a@pec.edu.in", "password": "x" })));
}

#[tokio::test]
async fn verify_otp_sends_query_params() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);
    mock.push_text(200, "Signup complete.");

    api.verify_otp("a@pec.edu.in", "1234").await.unwrap();

    let req = mock.last_request().unwrap();
    assert_eq!(req.url, "https://portal.test/api/user/verify-otp");
    assert_eq!(
        req.query,
        vec![("email".to_owned(), "a@pec.edu.in".to_owned()), ("otp".to_owned(), "1234".to_owned())]
    );
}

#[tokio::test]
async fn login_accepts_raw_token_body() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);
    mock.push_text(200, "raw.jwt.token");

    let payload = api.login("a@pec.edu.in", "pw").await.unwrap();
    assert_eq!(payload.token, "raw.jwt.token");
}

#[tokio::test]
async fn login_without_token_is_server_error() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);
    mock.push_json(200, json!({ "message": "ok" }));

    let err = api.login("a@pec.edu.in", "pw").await.unwrap_err();
    assert!(matches!(err, PortalError::Server { status: Some(200), .. }));
}

#[tokio::test]
async fn unreachable_maps_to_network_error() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);
    mock.push_unreachable();

    let err = api.profile().await.unwrap_err();
    assert!(err.is_network());
}

// =============================================================
// Unauthorized handling
// =============================================================

#[tokio::test]
async fn authenticated_401_clears_token_and_fires_handler() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "stale");
    let api = client_with(&mock, &storage);
    let fired = Arc::new(AtomicUsize::new(0));
    let fired_handler = fired.clone();
    api.set_unauthorized_handler(Some(Arc::new(move || {
        fired_handler.fetch_add(1, Ordering::SeqCst);
    })));
    mock.push_text(401, "");

    let err = api.list_materials().await.unwrap_err();

    assert_eq!(err, PortalError::Unauthorized);
    assert_eq!(storage.get("token"), None);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn late_401_keeps_token_from_newer_login() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "old");
    let api = client_with(&mock, &storage);
    let fired = Arc::new(AtomicUsize::new(0));
    let fired_handler = fired.clone();
    api.set_unauthorized_handler(Some(Arc::new(move || {
        fired_handler.fetch_add(1, Ordering::SeqCst);
    })));
    mock.push_text(401, "");

    let (result, ()) = tokio::join!(api.list_materials(), async {
        storage.set("token", "new");
    });

    assert_eq!(result.unwrap_err(), PortalError::Unauthorized);
    assert_eq!(storage.get("token").as_deref(), Some("new"));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn login_401_does_not_clear_token() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    storage.set("token", "kept");
    let api = client_with(&mock, &storage);
    mock.push_text(401, "Invalid email or password");

    let err = api.login("a@pec.edu.in", "bad").await.unwrap_err();

    assert!(matches!(err, PortalError::InvalidCredentials(_)));
    assert_eq!(storage.get("token").as_deref(), Some("kept"));
}

// =============================================================
// CRUD + MCQ
// =============================================================

#[tokio::test]
async fn create_course_validates_before_network() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);

    let err = api.create_course(&CourseDraft::default()).await.unwrap_err();

    assert!(matches!(err, PortalError::Validation(_)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn update_material_sends_query_params() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);
    mock.push_json(200, json!({ "id": 7, "title": "New", "courseId": 3 }));

    let update = MaterialUpdate { title: Some("New".to_owned()), description: None };
    let material = api.update_material(7, &update).await.unwrap();

    assert_eq!(material.course_id.as_deref(), Some("3"));
    let req = mock.last_request().unwrap();
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.url, "https://portal.test/api/materials/admin/7");
    assert_eq!(req.query, vec![("title".to_owned(), "New".to_owned())]);
}

#[tokio::test]
async fn generate_mcq_decodes_questions() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);
    mock.push_json(
        200,
        json!({ "questions": [
            { "question": "2+2?", "options": [ { "text": "4", "correct": true }, { "text": "5" } ] }
        ] }),
    );

    let request = GenerateMcqRequest { course_id: "3".to_owned(), topics: vec!["sums".to_owned()], number_of_questions: 15 };
    let questions = api.generate_mcq(&request).await.unwrap();

    assert_eq!(questions.len(), 1);
    assert!(questions[0].options[0].correct);
    assert!(!questions[0].options[1].correct);
    let req = mock.last_request().unwrap();
    assert_eq!(req.body, RequestBody::Json(json!({ "courseId": "3", "topics": ["sums"], "numberOfQuestions": 15 })));
}

#[tokio::test]
async fn malformed_list_is_server_error() {
    let mock = MockTransport::new();
    let storage = MemoryStorage::new();
    let api = client_with(&mock, &storage);
    mock.push_text(200, "<html>");

    let err = api.list_users().await.unwrap_err();
    assert_eq!(err, PortalError::server(Some(200), "malformed user list response"));
}
