//! Portal configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TOKEN_KEY: &str = "token";
pub const DEFAULT_VERIFICATION_EMAIL_KEY: &str = "verificationEmail";
pub const DEFAULT_RESET_EMAIL_KEY: &str = "resetEmail";
pub const DEFAULT_INSTITUTION_DOMAIN: &str = "pec.edu.in";
pub const DEFAULT_OTP_LENGTH: usize = 4;
pub const DEFAULT_OTP_COOLDOWN_SECS: u32 = 180;
pub const DEFAULT_VERIFY_REDIRECT_MS: u64 = 1500;
pub const DEFAULT_RESET_REDIRECT_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Storage keys used by the session store and the flow controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Durable key holding the bearer token.
    pub token: String,
    /// Volatile key holding the email awaiting signup verification.
    pub verification_email: String,
    /// Volatile key holding the email awaiting a password-reset code.
    pub reset_email: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN_KEY.to_owned(),
            verification_email: DEFAULT_VERIFICATION_EMAIL_KEY.to_owned(),
            reset_email: DEFAULT_RESET_EMAIL_KEY.to_owned(),
        }
    }
}

/// Which addresses may start a signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPolicy {
    pub institution_domain: String,
    pub allowed_emails: Vec<String>,
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self { institution_domain: DEFAULT_INSTITUTION_DOMAIN.to_owned(), allowed_emails: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpSettings {
    /// Expected code length; shorter or longer codes are rejected locally.
    pub code_length: usize,
    pub cooldown_secs: u32,
    pub verify_redirect: Duration,
    pub reset_redirect: Duration,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_OTP_LENGTH,
            cooldown_secs: DEFAULT_OTP_COOLDOWN_SECS,
            verify_redirect: Duration::from_millis(DEFAULT_VERIFY_REDIRECT_MS),
            reset_redirect: Duration::from_millis(DEFAULT_RESET_REDIRECT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// API base address without a trailing slash. Empty means same-origin.
    pub base_url: String,
    pub keys: StorageKeys,
    pub email_policy: EmailPolicy,
    pub otp: OtpSettings,
    /// Serve `/` as a public landing page instead of redirecting to login.
    pub public_landing: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            keys: StorageKeys::default(),
            email_policy: EmailPolicy::default(),
            otp: OtpSettings::default(),
            public_landing: false,
        }
    }
}

impl PortalConfig {
    /// Same-origin config used by the browser build.
    #[must_use]
    pub fn same_origin() -> Self {
        Self { base_url: String::new(), ..Self::default() }
    }

    /// Build config from environment variables.
    ///
    /// All optional:
    /// - `PORTAL_BASE_URL`: default `http://127.0.0.1:8080`
    /// - `PORTAL_TOKEN_KEY`, `PORTAL_VERIFICATION_EMAIL_KEY`, `PORTAL_RESET_EMAIL_KEY`
    /// - `PORTAL_INSTITUTION_DOMAIN`: default `pec.edu.in`
    /// - `PORTAL_ALLOWED_EMAILS`: comma-separated whitelist
    /// - `PORTAL_OTP_LENGTH`: default 4
    /// - `PORTAL_OTP_COOLDOWN_SECS`: default 180
    /// - `PORTAL_VERIFY_REDIRECT_MS`: default 1500
    /// - `PORTAL_RESET_REDIRECT_MS`: default 2000
    /// - `PORTAL_PUBLIC_LANDING`: `true`/`false`, default false
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric or boolean variable
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let base_url = std::env::var("PORTAL_BASE_URL")
            .unwrap_or(defaults.base_url)
            .trim_end_matches('/')
            .to_owned();

        let keys = StorageKeys {
            token: env_or("PORTAL_TOKEN_KEY", DEFAULT_TOKEN_KEY),
            verification_email: env_or("PORTAL_VERIFICATION_EMAIL_KEY", DEFAULT_VERIFICATION_EMAIL_KEY),
            reset_email: env_or("PORTAL_RESET_EMAIL_KEY", DEFAULT_RESET_EMAIL_KEY),
        };

        let email_policy = EmailPolicy {
            institution_domain: env_or("PORTAL_INSTITUTION_DOMAIN", DEFAULT_INSTITUTION_DOMAIN)
                .trim_start_matches('@')
                .to_ascii_lowercase(),
            allowed_emails: parse_email_list(std::env::var("PORTAL_ALLOWED_EMAILS").ok().as_deref()),
        };

        let otp = OtpSettings {
            code_length: env_parse("PORTAL_OTP_LENGTH", DEFAULT_OTP_LENGTH)?,
            cooldown_secs: env_parse("PORTAL_OTP_COOLDOWN_SECS", DEFAULT_OTP_COOLDOWN_SECS)?,
            verify_redirect: Duration::from_millis(env_parse("PORTAL_VERIFY_REDIRECT_MS", DEFAULT_VERIFY_REDIRECT_MS)?),
            reset_redirect: Duration::from_millis(env_parse("PORTAL_RESET_REDIRECT_MS", DEFAULT_RESET_REDIRECT_MS)?),
        };

        let public_landing = env_parse("PORTAL_PUBLIC_LANDING", false)?;

        Ok(Self { base_url, keys, email_policy, otp, public_landing })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn env_parse<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_email_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
