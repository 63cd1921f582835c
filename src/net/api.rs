//! Typed REST client for the portal API.
//!
//! Every request carries the stored bearer token when one exists. Responses
//! are classified into [`PortalError`] here, so components never see status
//! codes or the backend's mix of plain-text and JSON error bodies.
//!
//! ERROR HANDLING
//! ==============
//! A 401 from an authenticated endpoint clears the stored token and fires the
//! registered unauthorized handler (the session store installs one). Auth
//! endpoints (login, signup, OTP, reset) never trigger that path: a 401 there
//! is a credential failure, not an expired session.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};
use super::types::{
    Course, CourseDraft, GenerateMcqRequest, LoginPayload, Material, MaterialUpdate, MaterialUpload, McqQuestion,
    McqResponse, ResetToken, User, parse_login_payload, parse_profile, parse_reset_token,
};
use crate::error::PortalError;
use crate::storage::TokenStore;

/// Callback fired after a 401 from an authenticated endpoint.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// What kind of call produced a failure; drives error classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Signup,
    VerifyOtp,
    ResendOtp,
    ForgotPassword,
    VerifyResetOtp,
    ResetPassword,
    /// Anything that requires a valid session.
    Authenticated,
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{ "message" | "error" | "detail": ... }`, a JSON string, or plain
/// text.
#[must_use]
pub fn extract_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["message", "error", "detail"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .unwrap_or_default()
            .trim()
            .to_owned(),
        Ok(Value::String(text)) => text.trim().to_owned(),
        _ => body.trim().to_owned(),
    }
}

/// Map a non-2xx response to the error taxonomy.
#[must_use]
pub fn classify_failure(endpoint: Endpoint, status: u16, body: &str) -> PortalError {
    let message = extract_message(body);
    match (endpoint, status) {
        (Endpoint::Authenticated, 401) => PortalError::Unauthorized,
        (Endpoint::Login, 400 | 401 | 403 | 404) => PortalError::InvalidCredentials(message),
        (Endpoint::VerifyOtp | Endpoint::VerifyResetOtp, 400 | 404 | 410) => PortalError::InvalidOrExpiredOtp(message),
        (
            Endpoint::Signup | Endpoint::ForgotPassword | Endpoint::ResetPassword | Endpoint::ResendOtp,
            400..=499,
        ) => PortalError::Validation(if message.is_empty() { format!("Request rejected ({status})") } else { message }),
        _ => PortalError::server(Some(status), message),
    }
}

fn malformed(status: u16, what: &str) -> PortalError {
    PortalError::server(Some(status), format!("malformed {what} response"))
}

fn decode_json<T: DeserializeOwned>(response: &ApiResponse, what: &str) -> Result<T, PortalError> {
    serde_json::from_slice(&response.body).map_err(|_| malformed(response.status, what))
}

/// The HTTP client adapter: base address, bearer attachment, error mapping.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    tokens: TokenStore,
    on_unauthorized: Mutex<Option<UnauthorizedHandler>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, tokens: TokenStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { transport, base_url, tokens, on_unauthorized: Mutex::new(None) }
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install (or remove) the handler fired after an authenticated 401.
    pub fn set_unauthorized_handler(&self, handler: Option<UnauthorizedHandler>) {
        *self.on_unauthorized.lock().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    /// Absolute (or same-origin) URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute(
        &self,
        endpoint: Endpoint,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: RequestBody,
    ) -> Result<ApiResponse, PortalError> {
        let sent_with = self.tokens.get();
        let request = ApiRequest {
            method,
            url: self.url(path),
            query,
            bearer: sent_with.clone().map(SecretString::from),
            body,
        };
        tracing::debug!(method = method.as_str(), path, "api request");

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(path, error = %e, "api request got no response");
            PortalError::NetworkUnreachable(e.0)
        })?;

        if response.is_success() {
            return Ok(response);
        }

        let err = classify_failure(endpoint, response.status, &response.text());
        tracing::debug!(path, status = response.status, error = %err, "api request rejected");
        if err.is_unauthorized() {
            self.handle_unauthorized(sent_with.as_deref());
        }
        Err(err)
    }

    /// Clear the token the rejected request was sent with. A 401 for a token
    /// that has since been replaced by a newer login leaves the new one alone.
    fn handle_unauthorized(&self, sent_with: Option<&str>) {
        if self.tokens.get().as_deref() != sent_with {
            tracing::debug!("401 for a superseded token; keeping the current one");
            return;
        }
        tracing::info!("authenticated call returned 401; clearing stored token");
        self.tokens.clear();
        let handler = self.on_unauthorized.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let Some(handler) = handler {
            handler();
        }
    }

    async fn get(&self, path: &str) -> Result<ApiResponse, PortalError> {
        self.execute(Endpoint::Authenticated, Method::Get, path, Vec::new(), RequestBody::Empty)
            .await
    }

    fn email_otp_query(email: &str, otp: &str) -> Vec<(String, String)> {
        vec![("email".to_owned(), email.to_owned()), ("otp".to_owned(), otp.to_owned())]
    }

    // =============================================================
    // Auth
    // =============================================================

    /// `POST /api/user/login`.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` on rejection, `ServerError` when the success body
    /// carries no token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginPayload, PortalError> {
        let body = RequestBody::Json(json!({ "email": email, "password": password }));
        let response = self
            .execute(Endpoint::Login, Method::Post, "/api/user/login", Vec::new(), body)
            .await?;
        parse_login_payload(&response.text())
            .ok_or_else(|| PortalError::server(Some(response.status), "Login succeeded but no token was received"))
    }

    /// `POST /api/user/signup`. Returns the server's confirmation text.
    ///
    /// # Errors
    ///
    /// `ValidationError` when the server rejects the account (e.g. duplicate email).
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<String, PortalError> {
        let body = RequestBody::Json(json!({ "name": name, "email": email, "password": password }));
        let response = self
            .execute(Endpoint::Signup, Method::Post, "/api/user/signup", Vec::new(), body)
            .await?;
        Ok(extract_message(&response.text()))
    }

    /// `POST /api/user/verify-otp?email=&otp=`. Does not return a token.
    ///
    /// # Errors
    ///
    /// `InvalidOrExpiredOtp` when the code is rejected.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<String, PortalError> {
        let query = Self::email_otp_query(email, otp);
        let response = self
            .execute(Endpoint::VerifyOtp, Method::Post, "/api/user/verify-otp", query, RequestBody::Empty)
            .await?;
        Ok(extract_message(&response.text()))
    }

    /// `POST /api/user/resend-otp?email=`.
    ///
    /// # Errors
    ///
    /// Propagates transport and server failures.
    pub async fn resend_otp(&self, email: &str) -> Result<String, PortalError> {
        let query = vec![("email".to_owned(), email.to_owned())];
        let response = self
            .execute(Endpoint::ResendOtp, Method::Post, "/api/user/resend-otp", query, RequestBody::Empty)
            .await?;
        Ok(extract_message(&response.text()))
    }

    /// `POST /api/user/forgot-password`.
    ///
    /// # Errors
    ///
    /// Propagates transport and server failures.
    pub async fn forgot_password(&self, email: &str) -> Result<String, PortalError> {
        let body = RequestBody::Json(json!({ "email": email }));
        let response = self
            .execute(Endpoint::ForgotPassword, Method::Post, "/api/user/forgot-password", Vec::new(), body)
            .await?;
        Ok(extract_message(&response.text()))
    }

    /// `POST /api/user/verify-reset-otp?email=&otp=`.
    ///
    /// # Errors
    ///
    /// `InvalidOrExpiredOtp` on rejection, `ServerError` when no token comes back.
    pub async fn verify_reset_otp(&self, email: &str, otp: &str) -> Result<ResetToken, PortalError> {
        let query = Self::email_otp_query(email, otp);
        let response = self
            .execute(Endpoint::VerifyResetOtp, Method::Post, "/api/user/verify-reset-otp", query, RequestBody::Empty)
            .await?;
        parse_reset_token(&response.text()).ok_or_else(|| malformed(response.status, "reset token"))
    }

    /// `POST /api/user/reset-password`.
    ///
    /// # Errors
    ///
    /// `ValidationError` when the server rejects the token or password.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &ResetToken,
        new_password: &str,
    ) -> Result<String, PortalError> {
        let body = RequestBody::Json(json!({
            "email": email,
            "resetToken": token.expose(),
            "newPassword": new_password,
        }));
        let response = self
            .execute(Endpoint::ResetPassword, Method::Post, "/api/user/reset-password", Vec::new(), body)
            .await?;
        Ok(extract_message(&response.text()))
    }

    /// `GET /api/user/profile`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` on 401, `ServerError` when the body is not a user.
    pub async fn profile(&self) -> Result<User, PortalError> {
        let response = self.get("/api/user/profile").await?;
        parse_profile(&response.text()).ok_or_else(|| malformed(response.status, "profile"))
    }

    // =============================================================
    // Courses
    // =============================================================

    /// # Errors
    ///
    /// Propagates transport, auth, and decode failures.
    pub async fn list_courses(&self) -> Result<Vec<Course>, PortalError> {
        let response = self.get("/api/courses/admin/all").await?;
        decode_json(&response, "course list")
    }

    /// # Errors
    ///
    /// Validation failures are returned without a network call.
    pub async fn create_course(&self, draft: &CourseDraft) -> Result<Course, PortalError> {
        draft.validate()?;
        let body = RequestBody::Json(serde_json::to_value(draft).map_err(|e| PortalError::validation(e.to_string()))?);
        let response = self
            .execute(Endpoint::Authenticated, Method::Post, "/api/courses/admin", Vec::new(), body)
            .await?;
        decode_json(&response, "course")
    }

    /// # Errors
    ///
    /// Validation failures are returned without a network call.
    pub async fn update_course(&self, id: i64, draft: &CourseDraft) -> Result<Course, PortalError> {
        draft.validate()?;
        let body = RequestBody::Json(serde_json::to_value(draft).map_err(|e| PortalError::validation(e.to_string()))?);
        let path = format!("/api/courses/admin/{id}");
        let response = self
            .execute(Endpoint::Authenticated, Method::Put, &path, Vec::new(), body)
            .await?;
        decode_json(&response, "course")
    }

    /// # Errors
    ///
    /// Propagates transport and auth failures.
    pub async fn delete_course(&self, id: i64) -> Result<(), PortalError> {
        let path = format!("/api/courses/admin/{id}");
        self.execute(Endpoint::Authenticated, Method::Delete, &path, Vec::new(), RequestBody::Empty)
            .await?;
        Ok(())
    }

    // =============================================================
    // Materials
    // =============================================================

    /// # Errors
    ///
    /// Propagates transport, auth, and decode failures.
    pub async fn list_materials(&self) -> Result<Vec<Material>, PortalError> {
        let response = self.get("/api/materials/admin/all").await?;
        decode_json(&response, "material list")
    }

    /// Multipart upload of a new material.
    ///
    /// # Errors
    ///
    /// Validation failures are returned without a network call.
    pub async fn upload_material(&self, upload: MaterialUpload) -> Result<Material, PortalError> {
        let form = upload.into_form()?;
        let response = self
            .execute(
                Endpoint::Authenticated,
                Method::Post,
                "/api/materials/admin/upload",
                Vec::new(),
                RequestBody::Multipart(form),
            )
            .await?;
        decode_json(&response, "material")
    }

    /// # Errors
    ///
    /// Propagates transport, auth, and decode failures.
    pub async fn update_material(&self, id: i64, update: &MaterialUpdate) -> Result<Material, PortalError> {
        let path = format!("/api/materials/admin/{id}");
        let response = self
            .execute(Endpoint::Authenticated, Method::Put, &path, update.to_query(), RequestBody::Empty)
            .await?;
        decode_json(&response, "material")
    }

    /// # Errors
    ///
    /// Propagates transport and auth failures.
    pub async fn delete_material(&self, id: i64) -> Result<(), PortalError> {
        let path = format!("/api/materials/admin/{id}");
        self.execute(Endpoint::Authenticated, Method::Delete, &path, Vec::new(), RequestBody::Empty)
            .await?;
        Ok(())
    }

    /// Raw file bytes of a material.
    ///
    /// # Errors
    ///
    /// Propagates transport and auth failures.
    pub async fn download_material(&self, id: i64) -> Result<Vec<u8>, PortalError> {
        let response = self.get(&format!("/api/materials/download/{id}")).await?;
        Ok(response.body)
    }

    // =============================================================
    // Admin + MCQ
    // =============================================================

    /// # Errors
    ///
    /// Propagates transport, auth, and decode failures.
    pub async fn list_users(&self) -> Result<Vec<User>, PortalError> {
        let response = self.get("/api/admin/users").await?;
        decode_json(&response, "user list")
    }

    /// `POST /api/mcq/generate`. May take up to ~30 seconds; no timeout is
    /// imposed beyond the transport default.
    ///
    /// # Errors
    ///
    /// Propagates transport, auth, and decode failures.
    pub async fn generate_mcq(&self, request: &GenerateMcqRequest) -> Result<Vec<McqQuestion>, PortalError> {
        let body =
            RequestBody::Json(serde_json::to_value(request).map_err(|e| PortalError::validation(e.to_string()))?);
        let response = self
            .execute(Endpoint::Authenticated, Method::Post, "/api/mcq/generate", Vec::new(), body)
            .await?;
        let parsed: McqResponse = decode_json(&response, "mcq")?;
        Ok(parsed.questions)
    }
}
