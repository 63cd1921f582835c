//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Builds the one session store for the tab, mirrors it into signals, and
//! wraps every route in the guard. Pages reach the core through the
//! [`Portal`] context instead of globals.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_meta::{Stylesheet, Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::StaticSegment;
use leptos_router::hooks::use_location;
use portal::PortalConfig;
use portal::flow::reset::{ResetFlow, ResetTicket};
use portal::flow::signup::SignupFlow;
use portal::net::api::ApiClient;
use portal::state::route_guard::{AppRoute, GuardState, RouteGuard, RoutePolicy};
use portal::state::session::SessionStore;
use portal::storage::{EmailCache, TokenStore};

use crate::components::guarded::Guarded;
use crate::net::storage::{LocalStorage, SessionStorage};
use crate::net::transport::BrowserTransport;
use crate::pages::{
    dashboard::DashboardPage, forgot_password::ForgotPasswordPage, landing::LandingPage, login::LoginPage,
    otp_verification::OtpVerificationPage, reset_password::ResetPasswordPage, signup::SignupPage,
    verify_reset_otp::VerifyResetOtpPage,
};
use crate::state::auth::AuthState;

/// Core handles shared by every page.
#[derive(Clone)]
pub struct Portal {
    pub config: Arc<PortalConfig>,
    pub session: Arc<SessionStore>,
    pub guard: Arc<RouteGuard>,
}

impl Portal {
    #[must_use]
    pub fn new(config: PortalConfig) -> Self {
        let tokens = TokenStore::new(Arc::new(LocalStorage), config.keys.token.clone());
        let api = ApiClient::new(Arc::new(BrowserTransport), config.base_url.clone(), tokens);
        let session = SessionStore::new(api, config.email_policy.clone());
        let guard = RouteGuard::attach(&session, RoutePolicy { public_landing: config.public_landing });
        Self { config: Arc::new(config), session, guard }
    }

    #[must_use]
    pub fn policy(&self) -> RoutePolicy {
        self.guard.policy()
    }

    /// A fresh signup controller for one page; emails persist per tab.
    #[must_use]
    pub fn signup_flow(&self) -> Arc<SignupFlow> {
        let cache = EmailCache::new(Arc::new(SessionStorage), self.config.keys.verification_email.clone());
        Arc::new(SignupFlow::new(self.session.clone(), cache, self.config.otp.clone()))
    }

    #[must_use]
    pub fn reset_flow(&self) -> Arc<ResetFlow> {
        let cache = EmailCache::new(Arc::new(SessionStorage), self.config.keys.reset_email.clone());
        Arc::new(ResetFlow::new(self.session.clone(), cache, self.config.otp.clone()))
    }
}

/// In-memory hand-off of the reset ticket from the verify page to the reset
/// page. Never written to storage; a reload loses it.
#[derive(Clone, Copy)]
pub struct ResetHandoff(pub RwSignal<Option<ResetTicket>>);

/// Root application component.
///
/// Provides all shared contexts and sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let portal = Portal::new(PortalConfig { public_landing: true, ..PortalConfig::same_origin() });
    let auth = RwSignal::new(AuthState::from_session(&portal.session.snapshot()));
    let guard_state = RwSignal::new(portal.guard.state());

    // The guard subscribed first, so its state is current when this runs.
    let guard = portal.guard.clone();
    portal.session.subscribe(Arc::new(move |_, session| {
        auth.set(AuthState::from_session(session));
        guard_state.set(guard.state());
    }));

    provide_context(portal.clone());
    provide_context(auth);
    provide_context(guard_state);
    provide_context(ResetHandoff(RwSignal::new(None)));

    let session = portal.session.clone();
    leptos::task::spawn_local(async move {
        session.initialize().await;
    });
    let session = portal.session.clone();
    on_cleanup(move || session.teardown());

    view! {
        <Stylesheet id="leptos" href="/pkg/portal.css"/>
        <Title text="Academic Portal"/>

        <Router>
            <Routes fallback=UnknownRoute>
                <Route path=StaticSegment("") view=|| view! { <Guarded route=AppRoute::Landing><LandingPage/></Guarded> }/>
                <Route path=StaticSegment("login") view=|| view! { <Guarded route=AppRoute::Login><LoginPage/></Guarded> }/>
                <Route path=StaticSegment("signup") view=|| view! { <Guarded route=AppRoute::Signup><SignupPage/></Guarded> }/>
                <Route
                    path=StaticSegment("otp-verification")
                    view=|| view! { <Guarded route=AppRoute::OtpVerification><OtpVerificationPage/></Guarded> }
                />
                <Route
                    path=StaticSegment("forgot-password")
                    view=|| view! { <Guarded route=AppRoute::ForgotPassword><ForgotPasswordPage/></Guarded> }
                />
                <Route
                    path=StaticSegment("verify-reset-otp")
                    view=|| view! { <Guarded route=AppRoute::VerifyResetOtp><VerifyResetOtpPage/></Guarded> }
                />
                <Route
                    path=StaticSegment("reset-password")
                    view=|| view! { <Guarded route=AppRoute::ResetPassword><ResetPasswordPage/></Guarded> }
                />
                <Route path=StaticSegment("dashboard") view=|| view! { <Guarded route=AppRoute::Dashboard><DashboardPage/></Guarded> }/>
            </Routes>
        </Router>
    }
}

/// Fallback for unmatched paths; the guard always redirects away from it.
#[component]
fn UnknownRoute() -> impl IntoView {
    let path = use_location().pathname.get_untracked();
    let guard_state = expect_context::<RwSignal<GuardState>>();
    view! {
        <Guarded route=AppRoute::parse(&path)>
            <p>{move || if guard_state.get() == GuardState::Loading { "Loading..." } else { "Page not found." }}</p>
        </Guarded>
    }
}
