//! Password reset: `Request` → `AwaitingResetOtp` → `ResetForm` → `Done`.
//!
//! DESIGN
//! ======
//! The reset token issued by code verification lives only in memory, inside a
//! [`ResetTicket`] handed from the verify page to the reset page. The token is
//! taken out of the flow before the reset call is made, so it is spent whether
//! the server accepts it or not.

#[cfg(test)]
#[path = "reset_test.rs"]
mod reset_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::countdown::Countdown;
use super::{FlowResult, FlowStep, validate_code};
use crate::config::OtpSettings;
use crate::error::PortalError;
use crate::net::types::ResetToken;
use crate::state::route_guard::AppRoute;
use crate::state::session::SessionStore;
use crate::storage::EmailCache;
use crate::util::email::normalize_email;
use crate::util::in_flight::InFlight;
use crate::util::liveness::Liveness;

/// Generic acknowledgment; never reveals whether the account exists.
pub const RESET_ACK: &str = "If an account with that email exists, a reset code has been sent.";

const MISSING_TICKET: &str = "Your reset session is missing or has expired. Please request a new code.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetPhase {
    #[default]
    Request,
    AwaitingResetOtp,
    ResetForm,
    Done,
}

/// Email plus single-use token, carried between pages in memory only.
#[derive(Clone, Debug)]
pub struct ResetTicket {
    pub email: String,
    pub token: ResetToken,
}

impl ResetTicket {
    fn is_usable(&self) -> bool {
        !self.email.trim().is_empty() && !self.token.is_blank()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetState {
    pub phase: ResetPhase,
    pub email: Option<String>,
    pub countdown: Countdown,
    pub error: Option<String>,
    pub message: Option<String>,
    /// The reset page cannot proceed; the view should offer the way back to
    /// the request form.
    pub restart_required: bool,
}

pub struct ResetFlow {
    session: Arc<SessionStore>,
    cache: EmailCache,
    settings: OtpSettings,
    state: Mutex<ResetState>,
    ticket: Mutex<Option<ResetTicket>>,
    requesting: InFlight,
    verifying: InFlight,
    resending: InFlight,
    resetting: InFlight,
    liveness: Liveness,
}

impl std::fmt::Debug for ResetFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetFlow").field("state", &self.state()).finish_non_exhaustive()
    }
}

impl ResetFlow {
    #[must_use]
    pub fn new(session: Arc<SessionStore>, cache: EmailCache, settings: OtpSettings) -> Self {
        let countdown = Countdown::new(settings.cooldown_secs);
        Self {
            session,
            cache,
            settings,
            state: Mutex::new(ResetState {
                phase: ResetPhase::Request,
                email: None,
                countdown,
                error: None,
                message: None,
                restart_required: false,
            }),
            ticket: Mutex::new(None),
            requesting: InFlight::new(),
            verifying: InFlight::new(),
            resending: InFlight::new(),
            resetting: InFlight::new(),
            liveness: Liveness::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ResetState {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.requesting.is_busy() || self.verifying.is_busy() || self.resending.is_busy() || self.resetting.is_busy()
    }

    #[must_use]
    pub fn code_length(&self) -> usize {
        self.settings.code_length
    }

    // =========================================================================
    // REQUEST
    // =========================================================================

    /// Ask for a reset code. The email is cached for the verify page.
    ///
    /// # Errors
    ///
    /// Validation for a malformed address (no network call), otherwise
    /// server and network failures; the phase stays `Request`.
    pub async fn request(&self, email: &str) -> FlowResult {
        let Some(_ticket) = self.requesting.try_start() else {
            return Ok(FlowStep::Stay);
        };
        self.lock().error = None;

        let result = self.session.forgot_password(email).await;
        if !self.liveness.is_alive() {
            return Ok(FlowStep::Discarded);
        }
        if let Err(err) = result {
            return Err(self.fail(err));
        }

        let email = normalize_email(email).unwrap_or_else(|| email.trim().to_owned());
        self.cache.set(&email);
        tracing::info!("password reset requested");

        let mut state = self.lock();
        state.phase = ResetPhase::AwaitingResetOtp;
        state.email = Some(email);
        state.countdown.restart();
        state.message = Some(RESET_ACK.to_owned());
        state.restart_required = false;
        Ok(FlowStep::RedirectAfter { route: AppRoute::VerifyResetOtp, delay: self.settings.verify_redirect })
    }

    // =========================================================================
    // VERIFY
    // =========================================================================

    /// Enter the verify page; without a cached email go back to the request form.
    pub fn resume_verification(&self) -> FlowStep {
        let Some(email) = self.cache.get() else {
            let mut state = self.lock();
            state.phase = ResetPhase::Request;
            state.email = None;
            return FlowStep::Redirect(AppRoute::ForgotPassword);
        };

        let mut state = self.lock();
        let resumed =
            state.phase == ResetPhase::AwaitingResetOtp && state.email.as_deref() == Some(email.as_str());
        if !resumed {
            state.phase = ResetPhase::AwaitingResetOtp;
            state.email = Some(email);
            state.countdown.restart();
        }
        FlowStep::Stay
    }

    /// Verify the reset code. On success the ticket is held for the reset page
    /// and the cached email is cleared.
    ///
    /// # Errors
    ///
    /// Validation for a blank or short code, or `InvalidOrExpiredOtp`; the
    /// phase stays `AwaitingResetOtp`.
    pub async fn verify_code(&self, code: &str) -> FlowResult {
        let Some(email) = self.awaiting_email() else {
            return Ok(FlowStep::Redirect(AppRoute::ForgotPassword));
        };
        let code = validate_code(code, self.settings.code_length).map_err(|err| self.fail(err))?;
        let Some(_ticket) = self.verifying.try_start() else {
            return Ok(FlowStep::Stay);
        };
        self.lock().error = None;

        let result = self.session.verify_reset_otp(&email, &code).await;
        if !self.liveness.is_alive() {
            return Ok(FlowStep::Discarded);
        }
        let token = result.map_err(|err| self.fail(err))?;

        self.cache.clear();
        *self.ticket.lock().unwrap_or_else(PoisonError::into_inner) = Some(ResetTicket { email, token });
        let mut state = self.lock();
        state.phase = ResetPhase::ResetForm;
        state.message = Some("OTP verified. Please choose a new password.".to_owned());
        Ok(FlowStep::Redirect(AppRoute::ResetPassword))
    }

    /// Request another reset code once the countdown has run out.
    ///
    /// # Errors
    ///
    /// Server and network failures; the countdown is not rolled back.
    pub async fn resend(&self) -> FlowResult {
        let Some(email) = self.awaiting_email() else {
            return Ok(FlowStep::Redirect(AppRoute::ForgotPassword));
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

        let result = self.session.forgot_password(&email).await;
        if !self.liveness.is_alive() {
            return Ok(FlowStep::Discarded);
        }
        match result {
            Ok(_) => {
                self.lock().message = Some(RESET_ACK.to_owned());
                Ok(FlowStep::Stay)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn tick(&self) -> u32 {
        self.advance(1)
    }

    pub fn advance(&self, secs: u32) -> u32 {
        self.lock().countdown.advance(secs)
    }

    /// Hand the verified ticket to the next page.
    #[must_use]
    pub fn take_ticket(&self) -> Option<ResetTicket> {
        self.ticket.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    // =========================================================================
    // RESET
    // =========================================================================

    /// Install the ticket carried over from the verify page.
    ///
    /// A missing or blank ticket flags `restart_required` at once; no request
    /// will ever be made from this state.
    pub fn with_ticket(&self, ticket: Option<ResetTicket>) {
        let usable = ticket.as_ref().is_some_and(ResetTicket::is_usable);
        let email = ticket.as_ref().map(|t| t.email.clone());
        *self.ticket.lock().unwrap_or_else(PoisonError::into_inner) = ticket.filter(ResetTicket::is_usable);

        let mut state = self.lock();
        state.phase = ResetPhase::ResetForm;
        state.email = email;
        if usable {
            state.restart_required = false;
        } else {
            state.restart_required = true;
            state.error = Some(MISSING_TICKET.to_owned());
        }
    }

    /// Submit the new password with the held ticket.
    ///
    /// # Errors
    ///
    /// A missing ticket is a terminal local error (`restart_required`); blank
    /// or mismatched passwords are local validation errors that keep the
    /// ticket. Server failures spend the ticket.
    pub async fn reset_password(&self, new_password: &str, confirm_password: &str) -> FlowResult {
        let usable = self
            .ticket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(ResetTicket::is_usable);
        if !usable {
            let mut state = self.lock();
            state.restart_required = true;
            state.error = Some(MISSING_TICKET.to_owned());
            return Err(PortalError::validation(MISSING_TICKET));
        }
        if new_password.is_empty() {
            return Err(self.fail(PortalError::validation("Please enter a new password")));
        }
        if new_password != confirm_password {
            return Err(self.fail(PortalError::validation("Passwords do not match")));
        }

        let Some(_guard) = self.resetting.try_start() else {
            return Ok(FlowStep::Stay);
        };
        let Some(ticket) = self.take_ticket() else {
            return Ok(FlowStep::Stay);
        };
        self.lock().error = None;

        let result = self.session.reset_password(&ticket.email, &ticket.token, new_password).await;
        if !self.liveness.is_alive() {
            return Ok(FlowStep::Discarded);
        }
        if let Err(err) = result {
            self.lock().restart_required = true;
            return Err(self.fail(err));
        }

        self.cache.clear();
        tracing::info!("password reset complete");
        let mut state = self.lock();
        state.phase = ResetPhase::Done;
        state.message = Some("Password reset successful! Redirecting to login...".to_owned());
        Ok(FlowStep::RedirectAfter { route: AppRoute::Login, delay: self.settings.reset_redirect })
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Leave the flow: forget the cached email and any held ticket.
    pub fn abandon(&self) {
        self.cache.clear();
        self.ticket.lock().unwrap_or_else(PoisonError::into_inner).take();
        let mut state = self.lock();
        state.phase = ResetPhase::Request;
        state.email = None;
        state.error = None;
        state.message = None;
        state.restart_required = false;
        state.countdown.restart();
    }

    pub fn teardown(&self) {
        self.liveness.kill();
    }

    fn awaiting_email(&self) -> Option<String> {
        let state = self.lock();
        if state.phase == ResetPhase::AwaitingResetOtp { state.email.clone() } else { None }
    }

    fn fail(&self, err: PortalError) -> PortalError {
        self.lock().error = Some(err.user_message());
        err
    }

    fn lock(&self) -> MutexGuard<'_, ResetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
