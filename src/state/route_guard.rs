//! Route guard: which view may render for the current session state.
//!
//! DESIGN
//! ======
//! The guard is a three-state machine (`Loading`, `Authenticated`,
//! `Unauthenticated`) driven by session events. Transitions not listed in
//! [`GuardState::on`] leave the state unchanged, so a stray 401 during
//! startup cannot skip the loading placeholder.
//!
//! [`decide`] is a pure function of route, state, and policy; the browser
//! router and the CLI both call it.

#[cfg(test)]
#[path = "route_guard_test.rs"]
mod route_guard_test;

use std::sync::{Arc, Mutex, PoisonError};

use super::session::{Session, SessionEvent, SessionStore};

// =============================================================================
// STATE MACHINE
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GuardState {
    #[default]
    Loading,
    Authenticated,
    Unauthenticated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardEvent {
    Initialized { authenticated: bool },
    LoggedIn,
    LoggedOut,
    Unauthorized,
}

impl GuardEvent {
    /// Translate a published session event into a guard input.
    #[must_use]
    pub fn from_session(event: SessionEvent, session: &Session) -> Option<Self> {
        match event {
            SessionEvent::Initialized => Some(Self::Initialized { authenticated: session.is_authenticated() }),
            SessionEvent::LoggedIn => Some(Self::LoggedIn),
            SessionEvent::LoggedOut => Some(Self::LoggedOut),
            SessionEvent::Unauthorized => Some(Self::Unauthorized),
            SessionEvent::Updated => None,
        }
    }
}

impl GuardState {
    /// State implied by a snapshot, used when attaching to a live session.
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        if session.loading {
            Self::Loading
        } else if session.is_authenticated() {
            Self::Authenticated
        } else {
            Self::Unauthenticated
        }
    }

    #[must_use]
    pub fn on(self, event: GuardEvent) -> Self {
        match (self, event) {
            (Self::Loading, GuardEvent::Initialized { authenticated: true }) => Self::Authenticated,
            (Self::Loading, GuardEvent::Initialized { authenticated: false }) => Self::Unauthenticated,
            (Self::Authenticated, GuardEvent::LoggedOut | GuardEvent::Unauthorized) => Self::Unauthenticated,
            (Self::Unauthenticated, GuardEvent::LoggedIn) => Self::Authenticated,
            (state, _) => state,
        }
    }
}

// =============================================================================
// ROUTES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppRoute {
    Landing,
    Login,
    Signup,
    OtpVerification,
    ForgotPassword,
    VerifyResetOtp,
    ResetPassword,
    Dashboard,
    Unknown(String),
}

impl AppRoute {
    /// Parse a location path. Query string, fragment, and trailing slash are
    /// ignored; matching is case-insensitive.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let normalized = path.trim().trim_end_matches('/').to_ascii_lowercase();
        match normalized.as_str() {
            "" => Self::Landing,
            "/login" => Self::Login,
            "/signup" => Self::Signup,
            "/otp-verification" => Self::OtpVerification,
            "/forgot-password" => Self::ForgotPassword,
            "/verify-reset-otp" => Self::VerifyResetOtp,
            "/reset-password" => Self::ResetPassword,
            "/dashboard" => Self::Dashboard,
            _ => Self::Unknown(path.to_owned()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::OtpVerification => "/otp-verification",
            Self::ForgotPassword => "/forgot-password",
            Self::VerifyResetOtp => "/verify-reset-otp",
            Self::ResetPassword => "/reset-password",
            Self::Dashboard => "/dashboard",
            Self::Unknown(path) => path,
        }
    }

    /// Login, signup, OTP, and reset forms: only for logged-out users.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Self::Login
                | Self::Signup
                | Self::OtpVerification
                | Self::ForgotPassword
                | Self::VerifyResetOtp
                | Self::ResetPassword
        )
    }
}

/// Deployment-level routing options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Serve a public landing page at `/` instead of redirecting to login.
    pub public_landing: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Neutral placeholder while the session loads.
    Placeholder,
    Render,
    Redirect(AppRoute),
}

/// Navigation policy for one route in one guard state.
#[must_use]
pub fn decide(route: &AppRoute, state: GuardState, policy: RoutePolicy) -> RouteDecision {
    match state {
        GuardState::Loading => RouteDecision::Placeholder,
        GuardState::Authenticated => match route {
            AppRoute::Dashboard => RouteDecision::Render,
            _ => RouteDecision::Redirect(AppRoute::Dashboard),
        },
        GuardState::Unauthenticated => match route {
            r if r.is_public() => RouteDecision::Render,
            AppRoute::Landing if policy.public_landing => RouteDecision::Render,
            AppRoute::Unknown(_) if policy.public_landing => RouteDecision::Redirect(AppRoute::Landing),
            _ => RouteDecision::Redirect(AppRoute::Login),
        },
    }
}

// =============================================================================
// LIVE GUARD
// =============================================================================

/// Guard state kept in step with a [`SessionStore`].
#[derive(Debug)]
pub struct RouteGuard {
    state: Mutex<GuardState>,
    policy: RoutePolicy,
}

impl RouteGuard {
    #[must_use]
    pub fn new(policy: RoutePolicy) -> Self {
        Self { state: Mutex::new(GuardState::Loading), policy }
    }

    /// Seed from the current snapshot and follow every later session event.
    pub fn attach(session: &SessionStore, policy: RoutePolicy) -> Arc<Self> {
        let guard = Arc::new(Self {
            state: Mutex::new(GuardState::from_session(&session.snapshot())),
            policy,
        });
        let weak = Arc::downgrade(&guard);
        session.subscribe(Arc::new(move |event, snapshot| {
            let Some(guard) = weak.upgrade() else {
                return;
            };
            if let Some(event) = GuardEvent::from_session(event, snapshot) {
                guard.apply(event);
            }
        }));
        guard
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn policy(&self) -> RoutePolicy {
        self.policy
    }

    pub fn apply(&self, event: GuardEvent) -> GuardState {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let next = state.on(event);
        if next != *state {
            tracing::debug!(from = ?*state, to = ?next, ?event, "route guard transition");
        }
        *state = next;
        next
    }

    #[must_use]
    pub fn decide(&self, route: &AppRoute) -> RouteDecision {
        decide(route, self.state(), self.policy)
    }
}
