//! Signup verification: `Form` → `AwaitingOtp` → `Verified`.
//!
//! Verification finalizes the account but does not log the user in; the
//! terminal step redirects to the login form.

#[cfg(test)]
#[path = "signup_test.rs"]
mod signup_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::countdown::Countdown;
use super::{FlowResult, FlowStep, validate_code};
use crate::config::OtpSettings;
use crate::error::PortalError;
use crate::state::route_guard::AppRoute;
use crate::state::session::SessionStore;
use crate::storage::EmailCache;
use crate::util::email::normalize_email;
use crate::util::in_flight::InFlight;
use crate::util::liveness::Liveness;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignupPhase {
    #[default]
    Form,
    AwaitingOtp,
    Verified,
}

/// Snapshot rendered by the signup and OTP pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupState {
    pub phase: SignupPhase,
    pub email: Option<String>,
    pub countdown: Countdown,
    pub error: Option<String>,
    pub message: Option<String>,
}

pub struct SignupFlow {
    session: Arc<SessionStore>,
    cache: EmailCache,
    settings: OtpSettings,
    state: Mutex<SignupState>,
    submitting: InFlight,
    verifying: InFlight,
    resending: InFlight,
    liveness: Liveness,
}

impl std::fmt::Debug for SignupFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupFlow").field("state", &self.state()).finish_non_exhaustive()
    }
}

impl SignupFlow {
    #[must_use]
    pub fn new(session: Arc<SessionStore>, cache: EmailCache, settings: OtpSettings) -> Self {
        let countdown = Countdown::new(settings.cooldown_secs);
        Self {
            session,
            cache,
            settings,
            state: Mutex::new(SignupState {
                phase: SignupPhase::Form,
                email: None,
                countdown,
                error: None,
                message: None,
            }),
            submitting: InFlight::new(),
            verifying: InFlight::new(),
            resending: InFlight::new(),
            liveness: Liveness::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SignupState {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.submitting.is_busy() || self.verifying.is_busy() || self.resending.is_busy()
    }

    #[must_use]
    pub fn code_length(&self) -> usize {
        self.settings.code_length
    }

    // =========================================================================
    // FORM
    // =========================================================================

    /// Submit the signup form. On success the email is cached and the flow
    /// waits for the code with a fresh resend countdown.
    ///
    /// # Errors
    ///
    /// Validation (no network call) and server failures; the phase stays `Form`.
    pub async fn submit_form(&self, name: &str, email: &str, password: &str) -> FlowResult {
        let Some(_ticket) = self.submitting.try_start() else {
            return Ok(FlowStep::Stay);
        };
        self.lock().error = None;

        let result = self.session.signup(name, email, password).await;
        if !self.liveness.is_alive() {
            return Ok(FlowStep::Discarded);
        }

        let message = match result {
            Ok(message) => message,
            Err(err) => return Err(self.fail(err)),
        };
        let email = normalize_email(email).unwrap_or_else(|| email.trim().to_owned());
        self.cache.set(&email);
        tracing::info!(%email, "signup accepted; awaiting otp");

        let mut state = self.lock();
        state.phase = SignupPhase::AwaitingOtp;
        state.email = Some(email);
        state.countdown.restart();
        state.message = Some(if message.is_empty() { "OTP sent to your email".to_owned() } else { message });
        Ok(FlowStep::RedirectAfter { route: AppRoute::OtpVerification, delay: self.settings.verify_redirect })
    }

    // =========================================================================
    // OTP
    // =========================================================================

    /// Enter the OTP page. Without a cached email the page is unreachable and
    /// the view must go back to signup.
    pub fn enter_verification(&self) -> FlowStep {
        let Some(email) = self.cache.get() else {
            let mut state = self.lock();
            state.phase = SignupPhase::Form;
            state.email = None;
            return FlowStep::Redirect(AppRoute::Signup);
        };

        let mut state = self.lock();
        let resumed = state.phase == SignupPhase::AwaitingOtp && state.email.as_deref() == Some(email.as_str());
        if !resumed {
            state.phase = SignupPhase::AwaitingOtp;
            state.email = Some(email);
            state.countdown.restart();
        }
        FlowStep::Stay
    }

    /// Submit the code for the cached email.
    ///
    /// # Errors
    ///
    /// Validation for a blank or short code (no network call), or
    /// `InvalidOrExpiredOtp`; the phase stays `AwaitingOtp` and the cache is
    /// untouched.
    pub async fn submit_code(&self, code: &str) -> FlowResult {
        let Some(email) = self.awaiting_email() else {
            return Ok(FlowStep::Redirect(AppRoute::Signup));
        };
        let code = validate_code(code, self.settings.code_length).map_err(|err| self.fail(err))?;
        let Some(_ticket) = self.verifying.try_start() else {
            return Ok(FlowStep::Stay);
        };
        self.lock().error = None;

        let result = self.session.verify_otp(&email, &code).await;
        if !self.liveness.is_alive() {
            return Ok(FlowStep::Discarded);
        }
        if let Err(err) = result {
            return Err(self.fail(err));
        }

        self.cache.clear();
        tracing::info!(%email, "signup verified");
        let mut state = self.lock();
        state.phase = SignupPhase::Verified;
        state.message = Some("Email verified successfully! Please log in.".to_owned());
        Ok(FlowStep::RedirectAfter { route: AppRoute::Login, delay: self.settings.verify_redirect })
    }

    /// Request a new code. A no-op until the countdown reaches zero or while a
    /// resend is pending; the countdown restarts as soon as one is dispatched.
    ///
    /// # Errors
    ///
    /// Server and network failures; the countdown is not rolled back.
    pub async fn resend(&self) -> FlowResult {
        let Some(email) = self.awaiting_email() else {
            return Ok(FlowStep::Redirect(AppRoute::Signup));
        };
        if !self.lock().countdown.can_resend() {
            return Ok(FlowStep::Stay);
        }
        let Some(_ticket) = self.resending.try_start() else {
            return Ok(FlowStep::Stay);
        };
        {
            let mut state = self.lock();
            state.countdown.restart();
            state.error = None;
        }

        let result = self.session.resend_otp(&email).await;
        if !self.liveness.is_alive() {
            return Ok(FlowStep::Discarded);
        }
        match result {
            Ok(message) => {
                self.lock().message =
                    Some(if message.is_empty() { "A new OTP has been sent".to_owned() } else { message });
                Ok(FlowStep::Stay)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// One second elapsed on the resend countdown.
    pub fn tick(&self) -> u32 {
        self.advance(1)
    }

    pub fn advance(&self, secs: u32) -> u32 {
        self.lock().countdown.advance(secs)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Leave the flow: forget the cached email and start over.
    pub fn abandon(&self) {
        self.cache.clear();
        let mut state = self.lock();
        state.phase = SignupPhase::Form;
        state.email = None;
        state.error = None;
        state.message = None;
        state.countdown.restart();
    }

    /// The owning view unmounted; pending responses are dropped.
    pub fn teardown(&self) {
        self.liveness.kill();
    }

    fn awaiting_email(&self) -> Option<String> {
        let state = self.lock();
        if state.phase == SignupPhase::AwaitingOtp { state.email.clone() } else { None }
    }

    fn fail(&self, err: PortalError) -> PortalError {
        self.lock().error = Some(err.user_message());
        err
    }

    fn lock(&self) -> MutexGuard<'_, SignupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
