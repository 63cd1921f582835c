use std::sync::{Mutex, MutexGuard, PoisonError};

use super::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_lock`].
unsafe fn clear_portal_env() {
    unsafe {
        std::env::remove_var("PORTAL_BASE_URL");
        std::env::remove_var("PORTAL_TOKEN_KEY");
        std::env::remove_var("PORTAL_VERIFICATION_EMAIL_KEY");
        std::env::remove_var("PORTAL_RESET_EMAIL_KEY");
        std::env::remove_var("PORTAL_INSTITUTION_DOMAIN");
        std::env::remove_var("PORTAL_ALLOWED_EMAILS");
        std::env::remove_var("PORTAL_OTP_LENGTH");
        std::env::remove_var("PORTAL_OTP_COOLDOWN_SECS");
        std::env::remove_var("PORTAL_VERIFY_REDIRECT_MS");
        std::env::remove_var("PORTAL_RESET_REDIRECT_MS");
        std::env::remove_var("PORTAL_PUBLIC_LANDING");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_lock();
    unsafe { clear_portal_env() };

    let cfg = PortalConfig::from_env().unwrap();
    assert_eq!(cfg, PortalConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.keys.token, "token");
    assert_eq!(cfg.keys.verification_email, "verificationEmail");
    assert_eq!(cfg.otp.cooldown_secs, 180);
    assert_eq!(cfg.otp.code_length, 4);
    assert!(cfg.email_policy.allowed_emails.is_empty());
    assert!(!cfg.public_landing);
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_lock();
    unsafe {
        clear_portal_env();
        std::env::set_var("PORTAL_BASE_URL", "https://portal.example.test/");
        std::env::set_var("PORTAL_INSTITUTION_DOMAIN", "@Uni.EDU");
        std::env::set_var("PORTAL_ALLOWED_EMAILS", " Admin@Example.com , ,ops@example.com");
        std::env::set_var("PORTAL_OTP_LENGTH", "6");
        std::env::set_var("PORTAL_OTP_COOLDOWN_SECS", "60");
        std::env::set_var("PORTAL_RESET_REDIRECT_MS", "500");
        std::env::set_var("PORTAL_PUBLIC_LANDING", "true");
    }

    let cfg = PortalConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://portal.example.test");
    assert_eq!(cfg.email_policy.institution_domain, "uni.edu");
    assert_eq!(cfg.email_policy.allowed_emails, vec!["admin@example.com", "ops@example.com"]);
    assert_eq!(cfg.otp.code_length, 6);
    assert_eq!(cfg.otp.cooldown_secs, 60);
    assert_eq!(cfg.otp.reset_redirect, Duration::from_millis(500));
    assert_eq!(cfg.otp.verify_redirect, Duration::from_millis(DEFAULT_VERIFY_REDIRECT_MS));
    assert!(cfg.public_landing);

    unsafe { clear_portal_env() };
}

#[test]
fn from_env_rejects_bad_numbers() {
    let _guard = env_lock();
    unsafe {
        clear_portal_env();
        std::env::set_var("PORTAL_OTP_COOLDOWN_SECS", "soon");
    }

    let err = PortalConfig::from_env().unwrap_err();
    assert_eq!(err, ConfigError::InvalidValue { var: "PORTAL_OTP_COOLDOWN_SECS", value: "soon".to_owned() });

    unsafe { clear_portal_env() };
}

#[test]
fn same_origin_has_empty_base() {
    let cfg = PortalConfig::same_origin();
    assert!(cfg.base_url.is_empty());
    assert_eq!(cfg.keys, StorageKeys::default());
}
