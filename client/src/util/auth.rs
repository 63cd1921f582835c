//! Shared route-guard UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every routed page applies identical redirect behavior, driven by the core
//! `decide` policy and the guard-state signal.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use portal::state::route_guard::{AppRoute, GuardState, RouteDecision, RoutePolicy, decide};

/// Where to go instead of rendering `route`, if anywhere.
#[must_use]
pub fn redirect_path(route: &AppRoute, state: GuardState, policy: RoutePolicy) -> Option<String> {
    match decide(route, state, policy) {
        RouteDecision::Redirect(target) => Some(target.path().to_owned()),
        RouteDecision::Placeholder | RouteDecision::Render => None,
    }
}

/// Navigate away whenever the guard decides `route` may not render.
pub fn install_route_redirect<F>(route: AppRoute, guard: RwSignal<GuardState>, policy: RoutePolicy, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if let Some(path) = redirect_path(&route, guard.get(), policy) {
            navigate(&path, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}
