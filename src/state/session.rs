//! Session store: the single source of truth for "who is logged in".
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`SessionStore`] is created at startup, `initialize`d once, and shared
//! with every view. It owns the bearer token slot through its [`ApiClient`] and
//! publishes a [`Session`] snapshot to subscribers after every mutation.
//!
//! DESIGN
//! ======
//! `is_authenticated` means "a token is present", not "a profile is loaded".
//! A profile fetch that fails for any reason other than 401 keeps the token,
//! so a network hiccup never silently logs the user out.
//!
//! Every login and every clear bumps the session epoch. A profile fetch
//! applies its result only if the epoch it started under is still current,
//! so a fetch that outlives `logout` cannot bring the user back.
//!
//! Signup and OTP verification never authenticate. Verification only
//! finalizes the account; a separate `login` call obtains the session.
//!
//! ERROR HANDLING
//! ==============
//! A 401 from any authenticated call lands in the unauthorized hook installed
//! on the API client, which runs the same clear path as `logout`. Locks are
//! never held across an await, and listeners run after the lock is released.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::EmailPolicy;
use crate::error::PortalError;
use crate::net::api::ApiClient;
use crate::net::types::{ResetToken, User};
use crate::util::email::{is_signup_allowed, normalize_email, signup_rejection_message};
use crate::util::liveness::Liveness;

const FILL_ALL_FIELDS: &str = "Please fill in all fields";

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Authentication state as seen by views.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub current_user: Option<User>,
    pub token: Option<String>,
    /// True until `initialize` settles.
    pub loading: bool,
    /// Last user-visible failure of a session operation.
    pub error: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(User::is_admin)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("current_user", &self.current_user)
            .field("has_token", &self.token.is_some())
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish()
    }
}

/// Why a snapshot was published.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// `initialize` settled.
    Initialized,
    LoggedIn,
    LoggedOut,
    /// An authenticated call returned 401.
    Unauthorized,
    /// Profile or error changed without an auth transition.
    Updated,
}

pub type SessionListener = Arc<dyn Fn(SessionEvent, &Session) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    api: ApiClient,
    email_policy: EmailPolicy,
    session: Mutex<Session>,
    listeners: Mutex<Vec<(ListenerId, SessionListener)>>,
    next_listener: AtomicU64,
    logging_out: AtomicBool,
    epoch: AtomicU64,
    liveness: Liveness,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("api", &self.api)
            .field("session", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build the store and install its unauthorized hook on `api`.
    ///
    /// The session starts in the loading state; call [`Self::initialize`].
    pub fn new(api: ApiClient, email_policy: EmailPolicy) -> Arc<Self> {
        let store = Arc::new(Self {
            api,
            email_policy,
            session: Mutex::new(Session { loading: true, ..Session::default() }),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            logging_out: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            liveness: Liveness::new(),
        });
        let weak = Arc::downgrade(&store);
        store.api.set_unauthorized_handler(Some(Arc::new(move || {
            if let Some(store) = weak.upgrade() {
                store.clear(SessionEvent::Unauthorized);
            }
        })));
        store
    }

    /// The HTTP adapter, for views that call course/material/MCQ endpoints.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn email_policy(&self) -> &EmailPolicy {
        &self.email_policy
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.lock().is_admin()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.lock().current_user.clone()
    }

    /// Register a listener called with every published snapshot.
    pub fn subscribe(&self, listener: SessionListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Hydrate from the persisted token. Always ends with `loading == false`.
    pub async fn initialize(&self) {
        let Some(token) = self.api.tokens().get() else {
            tracing::debug!("no stored token; starting logged out");
            self.update(SessionEvent::Initialized, |s| {
                s.token = None;
                s.current_user = None;
                s.loading = false;
            });
            return;
        };

        let started = self.epoch();
        self.update(SessionEvent::Updated, |s| {
            s.token = Some(token);
            s.loading = true;
        });

        let result = self.api.profile().await;
        if !self.liveness.is_alive() {
            return;
        }

        match result {
            Ok(user) => {
                let email = user.email.clone();
                self.update(SessionEvent::Initialized, |s| {
                    if self.epoch() == started {
                        tracing::info!(%email, "session restored");
                        s.current_user = Some(user);
                        s.error = None;
                    } else {
                        tracing::debug!("session changed during restore; dropping profile");
                    }
                    s.loading = false;
                });
            }
            Err(err) if err.is_unauthorized() => {
                // The unauthorized hook already cleared token and user.
                self.update(SessionEvent::Initialized, |s| {
                    if self.epoch() == started {
                        s.token = None;
                        s.current_user = None;
                    }
                    s.loading = false;
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "profile fetch failed; keeping stored token");
                self.update(SessionEvent::Initialized, |s| {
                    if self.epoch() == started {
                        s.current_user = None;
                    }
                    s.loading = false;
                });
            }
        }
    }

    /// Detach from the API client and drop every late result from now on.
    pub fn teardown(&self) {
        self.liveness.kill();
        self.api.set_unauthorized_handler(None);
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    // =========================================================================
    // AUTH OPERATIONS
    // =========================================================================

    /// Log in and persist the token. Returns the user when one is known.
    ///
    /// When the login body carries no user, the profile is fetched; a failure
    /// there (other than 401) leaves the session authenticated without a user.
    ///
    /// # Errors
    ///
    /// `Validation` for blank fields (no network call), `InvalidCredentials`,
    /// `Server`, or `NetworkUnreachable` from the login call.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<User>, PortalError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(PortalError::validation(FILL_ALL_FIELDS));
        }

        let payload = match self.api.login(email, password).await {
            Ok(payload) => payload,
            Err(err) => {
                self.record_error(&err);
                return Err(err);
            }
        };
        if !self.liveness.is_alive() {
            return Ok(payload.user);
        }

        self.api.tokens().set(&payload.token);
        let embedded = payload.user;
        let known = embedded.clone();
        self.update(SessionEvent::LoggedIn, |s| {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            s.token = Some(payload.token);
            s.current_user = embedded;
            s.loading = false;
            s.error = None;
        });
        tracing::info!(email, "logged in");

        if known.is_some() {
            return Ok(known);
        }
        match self.refresh_profile().await {
            Ok(user) => Ok(Some(user)),
            Err(err) if err.is_unauthorized() => Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "profile fetch after login failed");
                Ok(None)
            }
        }
    }

    /// Create an account and trigger the signup OTP. Does not authenticate.
    ///
    /// # Errors
    ///
    /// `Validation` for blank fields or a non-institutional address (no
    /// network call); `Validation`/`Server`/`NetworkUnreachable` from the server.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<String, PortalError> {
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(PortalError::validation(FILL_ALL_FIELDS));
        }
        let email = match normalize_email(email) {
            Some(email) if is_signup_allowed(&email, &self.email_policy) => email,
            _ => return Err(PortalError::validation(signup_rejection_message(&self.email_policy))),
        };

        self.api.signup(name, &email, password).await.inspect_err(|err| self.record_error(err))
    }

    /// Finalize a signup. Does not authenticate; call [`Self::login`] next.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank code, `InvalidOrExpiredOtp` on rejection.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<String, PortalError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(PortalError::validation("Please enter the OTP"));
        }
        self.api.verify_otp(email.trim(), code).await
    }

    /// # Errors
    ///
    /// Propagates adapter failures.
    pub async fn resend_otp(&self, email: &str) -> Result<String, PortalError> {
        self.api.resend_otp(email.trim()).await
    }

    /// # Errors
    ///
    /// `Validation` for a malformed address; otherwise adapter failures.
    pub async fn forgot_password(&self, email: &str) -> Result<String, PortalError> {
        let Some(email) = normalize_email(email) else {
            return Err(PortalError::validation("Please enter a valid email address"));
        };
        self.api.forgot_password(&email).await
    }

    /// # Errors
    ///
    /// `Validation` for a blank code, `InvalidOrExpiredOtp` on rejection.
    pub async fn verify_reset_otp(&self, email: &str, code: &str) -> Result<ResetToken, PortalError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(PortalError::validation("Please enter the OTP"));
        }
        self.api.verify_reset_otp(email.trim(), code).await
    }

    /// # Errors
    ///
    /// `Validation` for a missing email, blank token, or blank password (no
    /// network call); otherwise adapter failures.
    pub async fn reset_password(
        &self,
        email: &str,
        token: &ResetToken,
        new_password: &str,
    ) -> Result<String, PortalError> {
        if email.trim().is_empty() || token.is_blank() {
            return Err(PortalError::validation("Reset session is missing. Please request a new code."));
        }
        if new_password.is_empty() {
            return Err(PortalError::validation("Please enter a new password"));
        }
        self.api.reset_password(email.trim(), token, new_password).await
    }

    /// Re-fetch the profile and replace the user wholesale.
    ///
    /// # Errors
    ///
    /// Propagates adapter failures; a 401 also clears the session. A result
    /// that arrives after the session was cleared or replaced is returned but
    /// not stored.
    pub async fn refresh_profile(&self) -> Result<User, PortalError> {
        let started = self.epoch();
        let user = self.api.profile().await?;
        if self.liveness.is_alive() {
            let stored = user.clone();
            self.update(SessionEvent::Updated, |s| {
                if self.epoch() == started && s.token.is_some() {
                    s.current_user = Some(stored);
                } else {
                    tracing::debug!("session changed during profile fetch; dropping profile");
                }
            });
        }
        Ok(user)
    }

    /// Clear token and user. Idempotent; concurrent callers after the first
    /// are no-ops. Returns whether anything was cleared.
    pub fn logout(&self) -> bool {
        self.clear(SessionEvent::LoggedOut)
    }

    fn clear(&self, event: SessionEvent) -> bool {
        if self
            .logging_out
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let stored = self.api.tokens().get().is_some();
        let held = {
            let session = self.lock();
            self.epoch.fetch_add(1, Ordering::AcqRel);
            session.token.is_some() || session.current_user.is_some()
        };
        if stored {
            self.api.tokens().clear();
        }
        if held || stored {
            tracing::info!(?event, "session cleared");
            self.update(event, |s| {
                s.token = None;
                s.current_user = None;
            });
        }

        self.logging_out.store(false, Ordering::Release);
        held || stored
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_error(&self, err: &PortalError) {
        if !self.liveness.is_alive() || matches!(err, PortalError::Validation(_)) {
            return;
        }
        let message = err.user_message();
        self.update(SessionEvent::Updated, |s| s.error = Some(message));
    }

    fn update(&self, event: SessionEvent, apply: impl FnOnce(&mut Session)) {
        let snapshot = {
            let mut session = self.lock();
            apply(&mut session);
            session.clone()
        };
        let listeners: Vec<SessionListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event, &snapshot);
        }
    }
}
