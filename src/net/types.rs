//! Wire DTOs for the portal REST API.
//!
//! DESIGN
//! ======
//! The backend is loose about shapes: numbers arrive as strings and vice
//! versa, auth endpoints may answer with a bare token string, and the profile
//! endpoint sometimes wraps the user in `{ success, user }`. The parsing
//! helpers here absorb that so the rest of the crate sees one typed shape.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use secrecy::{ExposeSecret, SecretString};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::PortalError;
use crate::net::transport::{FilePart, MultipartForm};

/// Account role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular account. The backend also calls this `USER`.
    #[default]
    #[serde(alias = "USER", alias = "user", alias = "student")]
    Student,
    #[serde(alias = "admin")]
    Admin,
}

/// The logged-in account, replaced wholesale on every profile fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    pub batch_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    pub current_semester: Option<u32>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Token (and optionally the user) returned by a successful login.
#[derive(Clone, Debug)]
pub struct LoginPayload {
    pub token: String,
    pub user: Option<User>,
}

/// Single-use credential issued after a password-reset code is verified.
///
/// Held in memory only; `Debug` never prints the value.
#[derive(Clone, Debug)]
pub struct ResetToken(SecretString);

impl ResetToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

/// A course as listed for administrators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub course_code: String,
    pub course_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub department: String,
    #[serde(default, deserialize_with = "deserialize_opt_u32")]
    pub semester: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    pub batch_year: Option<String>,
}

/// Body for course create/update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub course_code: String,
    pub course_name: String,
    pub description: String,
    pub department: String,
    pub semester: u32,
    pub batch_year: String,
}

impl CourseDraft {
    /// # Errors
    ///
    /// Returns a validation error when a required field is blank.
    pub fn validate(&self) -> Result<(), PortalError> {
        let required = [&self.course_code, &self.course_name, &self.department, &self.batch_year];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(PortalError::validation("Please fill all required fields"));
        }
        Ok(())
    }
}

/// An uploaded study material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    pub course_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// A new material: metadata plus the file itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialUpload {
    pub title: String,
    pub description: String,
    pub course_id: String,
    pub file: Option<FilePart>,
}

impl MaterialUpload {
    /// Validate and convert into the multipart form the upload endpoint expects.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the title, course, or file is missing.
    pub fn into_form(self) -> Result<MultipartForm, PortalError> {
        let Some(file) = self.file else {
            return Err(PortalError::validation("Please fill all required fields and select a file"));
        };
        if self.title.trim().is_empty() || self.course_id.trim().is_empty() {
            return Err(PortalError::validation("Please fill all required fields and select a file"));
        }
        Ok(MultipartForm {
            fields: vec![
                ("title".to_owned(), self.title.trim().to_owned()),
                ("description".to_owned(), self.description),
                ("courseId".to_owned(), self.course_id.trim().to_owned()),
            ],
            file: Some(("file".to_owned(), file)),
        })
    }
}

/// Partial metadata update; sent as query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl MaterialUpdate {
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(title) = &self.title {
            query.push(("title".to_owned(), title.clone()));
        }
        if let Some(description) = &self.description {
            query.push(("description".to_owned(), description.clone()));
        }
        query
    }
}

/// One answer choice of a generated question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqOption {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

/// A generated multiple-choice question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqQuestion {
    pub question: String,
    pub options: Vec<McqOption>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMcqRequest {
    pub course_id: String,
    pub topics: Vec<String>,
    pub number_of_questions: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct McqResponse {
    #[serde(default)]
    pub questions: Vec<McqQuestion>,
}

/// Parse a login body: `{ token, ... }`, a JSON string, or a raw token.
pub(crate) fn parse_login_payload(body: &str) -> Option<LoginPayload> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            let token = map.get("token").and_then(Value::as_str).filter(|t| !t.trim().is_empty())?;
            let user = map
                .get("user")
                .and_then(|u| serde_json::from_value::<User>(u.clone()).ok())
                .or_else(|| serde_json::from_value::<User>(Value::Object(map.clone())).ok());
            Some(LoginPayload { token: token.trim().to_owned(), user })
        }
        Ok(Value::String(token)) => raw_token(&token).map(|token| LoginPayload { token, user: None }),
        Ok(_) => None,
        Err(_) => raw_token(body).map(|token| LoginPayload { token, user: None }),
    }
}

/// Parse a profile body: a bare user or `{ success, user }`.
pub(crate) fn parse_profile(body: &str) -> Option<User> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    if let Some(map) = value.as_object() {
        if map.get("success").and_then(Value::as_bool) == Some(false) {
            return None;
        }
        if let Some(user) = map.get("user") {
            return serde_json::from_value(user.clone()).ok();
        }
    }
    serde_json::from_value(value).ok()
}

/// Parse a verify-reset-otp body: `{ resetToken }`, a JSON string, or raw text.
pub(crate) fn parse_reset_token(body: &str) -> Option<ResetToken> {
    let token = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("resetToken")
            .or_else(|| map.get("token"))
            .and_then(Value::as_str)
            .and_then(raw_token),
        Ok(Value::String(token)) => raw_token(&token),
        Ok(_) => None,
        Err(_) => raw_token(body),
    }?;
    Some(ResetToken::new(token))
}

fn raw_token(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }
    Some(trimmed.to_owned())
}

fn deserialize_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected string or number, got {other}"))),
    }
}

fn deserialize_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected unsigned integer, got {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected unsigned integer, got {s}"))),
        Some(other) => Err(D::Error::custom(format!("expected unsigned integer, got {other}"))),
    }
}
