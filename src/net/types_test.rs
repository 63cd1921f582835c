use super::*;
use serde_json::json;

#[test]
fn user_accepts_backend_role_aliases_and_loose_numbers() {
    let user: User = serde_json::from_value(json!({
        "name": "Asha",
        "email": "asha@pec.edu.in",
        "role": "USER",
        "department": "CSE",
        "batchYear": 2022,
        "currentSemester": "5"
    }))
    .unwrap();
    assert_eq!(user.role, Role::Student);
    assert_eq!(user.batch_year.as_deref(), Some("2022"));
    assert_eq!(user.current_semester, Some(5));
    assert!(!user.is_admin());
}

#[test]
fn user_defaults_missing_optional_fields() {
    let user: User = serde_json::from_value(json!({
        "name": "Root",
        "email": "root@pec.edu.in",
        "role": "ADMIN"
    }))
    .unwrap();
    assert!(user.is_admin());
    assert_eq!(user.department, None);
    assert_eq!(user.current_semester, None);
}

#[test]
fn login_payload_from_json_object() {
    let payload = parse_login_payload(r#"{"token":"abc"}"#).unwrap();
    assert_eq!(payload.token, "abc");
    assert!(payload.user.is_none());
}

#[test]
fn login_payload_with_embedded_user() {
    let body = json!({
        "token": "abc",
        "user": { "name": "Asha", "email": "asha@pec.edu.in", "role": "STUDENT" }
    })
    .to_string();
    let payload = parse_login_payload(&body).unwrap();
    assert_eq!(payload.user.map(|u| u.name), Some("Asha".to_owned()));
}

#[test]
fn login_payload_from_raw_token_text() {
    assert_eq!(parse_login_payload("eyJhbGciOi.payload.sig\n").unwrap().token, "eyJhbGciOi.payload.sig");
    assert_eq!(parse_login_payload(r#""quoted-token""#).unwrap().token, "quoted-token");
}

#[test]
fn login_payload_rejects_missing_token() {
    assert!(parse_login_payload(r#"{"message":"ok"}"#).is_none());
    assert!(parse_login_payload(r#"{"token":""}"#).is_none());
    assert!(parse_login_payload("").is_none());
    assert!(parse_login_payload("Login failed for user").is_none());
    assert!(parse_login_payload("42").is_none());
}

#[test]
fn profile_accepts_wrapped_and_bare_shapes() {
    let bare = json!({ "name": "Asha", "email": "asha@pec.edu.in" }).to_string();
    assert_eq!(parse_profile(&bare).map(|u| u.email), Some("asha@pec.edu.in".to_owned()));

    let wrapped = json!({ "success": true, "user": { "name": "Asha", "email": "asha@pec.edu.in" } }).to_string();
    assert_eq!(parse_profile(&wrapped).map(|u| u.name), Some("Asha".to_owned()));

    let failed = json!({ "success": false, "user": { "name": "Asha", "email": "asha@pec.edu.in" } }).to_string();
    assert!(parse_profile(&failed).is_none());
    assert!(parse_profile("not json").is_none());
}

#[test]
fn reset_token_parsing_and_redaction() {
    let token = parse_reset_token(r#"{"resetToken":"r-123"}"#).unwrap();
    assert_eq!(token.expose(), "r-123");
    assert!(!format!("{token:?}").contains("r-123"));
    assert_eq!(parse_reset_token("r-456").unwrap().expose(), "r-456");
    assert!(parse_reset_token(r#"{"resetToken":""}"#).is_none());
    assert!(ResetToken::new("  ").is_blank());
}

#[test]
fn course_draft_requires_core_fields() {
    let mut draft = CourseDraft {
        course_code: "CS101".to_owned(),
        course_name: "Intro".to_owned(),
        department: "CSE".to_owned(),
        batch_year: "2022".to_owned(),
        semester: 1,
        ..CourseDraft::default()
    };
    assert!(draft.validate().is_ok());
    draft.department = " ".to_owned();
    assert_eq!(draft.validate(), Err(PortalError::validation("Please fill all required fields")));
}

#[test]
fn course_draft_serializes_camel_case() {
    let draft = CourseDraft { course_code: "CS101".to_owned(), batch_year: "2022".to_owned(), ..CourseDraft::default() };
    let value = serde_json::to_value(&draft).unwrap();
    assert_eq!(value["courseCode"], "CS101");
    assert_eq!(value["batchYear"], "2022");
}

#[test]
fn material_upload_requires_file_title_and_course() {
    let file = FilePart { file_name: "notes.pdf".to_owned(), content_type: None, bytes: vec![1, 2, 3] };
    let missing_file =
        MaterialUpload { title: "Notes".to_owned(), description: String::new(), course_id: "3".to_owned(), file: None };
    assert!(missing_file.into_form().is_err());

    let missing_title = MaterialUpload {
        title: " ".to_owned(),
        description: String::new(),
        course_id: "3".to_owned(),
        file: Some(file.clone()),
    };
    assert!(missing_title.into_form().is_err());

    let ok = MaterialUpload {
        title: "Notes".to_owned(),
        description: "week 1".to_owned(),
        course_id: "3".to_owned(),
        file: Some(file),
    };
    let form = ok.into_form().unwrap();
    assert!(form.fields.contains(&("courseId".to_owned(), "3".to_owned())));
    assert_eq!(form.file.as_ref().map(|(name, _)| name.as_str()), Some("file"));
}

#[test]
fn material_update_only_sends_present_fields() {
    let update = MaterialUpdate { title: Some("New".to_owned()), description: None };
    assert_eq!(update.to_query(), vec![("title".to_owned(), "New".to_owned())]);
    assert!(MaterialUpdate::default().to_query().is_empty());
}
