//! Error taxonomy shared by every portal component.
//!
//! ERROR HANDLING
//! ==============
//! Transport and server failures are normalized into [`PortalError`] at the
//! HTTP boundary (`net::api`). Components above it never inspect raw status
//! codes or response bodies. `Unauthorized` is the only variant with a global
//! side effect (session clear); the session store handles that, views just
//! render [`PortalError::user_message`].

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Failure surfaced by a portal operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PortalError {
    /// Client-side validation failed; no network call was made.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Login rejected by the server.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    /// OTP code rejected or expired.
    #[error("invalid or expired otp: {0}")]
    InvalidOrExpiredOtp(String),
    /// An authenticated call was rejected with 401.
    #[error("unauthorized")]
    Unauthorized,
    /// 5xx, unexpected 4xx, or a success body that could not be decoded.
    #[error("server error ({status:?}): {message}")]
    Server { status: Option<u16>, message: String },
    /// No response was received.
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
}

impl PortalError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnreachable(_))
    }

    /// Inline message shown next to the form that triggered the failure.
    ///
    /// Server-provided text is preferred when present; network failures always
    /// use the fixed "no response" wording.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::InvalidCredentials(msg) => non_empty_or(msg, "Invalid credentials or server error. Please try again."),
            Self::InvalidOrExpiredOtp(_) => "Invalid or expired OTP. Please try again.".to_owned(),
            Self::Unauthorized => "Your session has expired. Please log in again.".to_owned(),
            Self::Server { message, .. } => non_empty_or(message, "Something went wrong on the server. Please try again."),
            Self::NetworkUnreachable(_) => "No response from server. Please try again later.".to_owned(),
        }
    }
}

fn non_empty_or(msg: &str, fallback: &str) -> String {
    let trimmed = msg.trim();
    if trimmed.is_empty() { fallback.to_owned() } else { trimmed.to_owned() }
}
