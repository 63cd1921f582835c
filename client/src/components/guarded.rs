//! Route wrapper applying the navigation policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every routed page sits inside [`Guarded`]. While the session is loading the
//! wrapper shows a neutral placeholder; when the policy says redirect it
//! navigates away and never mounts the page.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use portal::state::route_guard::{AppRoute, GuardState, RouteDecision, decide};

use crate::app::Portal;
use crate::util::auth::install_route_redirect;

#[component]
pub fn Guarded(route: AppRoute, children: ChildrenFn) -> impl IntoView {
    let portal = expect_context::<Portal>();
    let guard = expect_context::<RwSignal<GuardState>>();
    let policy = portal.policy();

    install_route_redirect(route.clone(), guard, policy, use_navigate());

    let renders = move || decide(&route, guard.get(), policy) == RouteDecision::Render;

    view! {
        <Show
            when=renders
            fallback=move || {
                view! {
                    <div class="route-placeholder">
                        <p>{move || if guard.get() == GuardState::Loading { "Loading..." } else { "Redirecting..." }}</p>
                    </div>
                }
            }
        >
            {children()}
        </Show>
    }
}
