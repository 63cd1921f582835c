//! Login page with email + password credentials.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use portal::state::route_guard::AppRoute;
use portal::util::liveness::Liveness;

use crate::app::Portal;

#[component]
pub fn LoginPage() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let navigate = use_navigate();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let liveness = Liveness::new();
    let cleanup = liveness.clone();
    on_cleanup(move || cleanup.kill());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        info.set(None);

        let session = portal.session.clone();
        let navigate = navigate.clone();
        let liveness = liveness.clone();
        let (email_value, password_value) = (email.get_untracked(), password.get_untracked());
        leptos::task::spawn_local(async move {
            let result = session.login(&email_value, &password_value).await;
            if !liveness.is_alive() {
                return;
            }
            busy.set(false);
            match result {
                Ok(_) => navigate(AppRoute::Dashboard.path(), NavigateOptions::default()),
                Err(e) => info.set(Some(e.user_message())),
            }
        });
    };

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Academic Portal"</h1>
                <p class="auth-card__subtitle">"Sign in with your institutional account"</p>
                <form class="auth-form" on:submit=on_submit>
                    <input
                        class="auth-input"
                        type="email"
                        placeholder="you@pec.edu.in"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="auth-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="auth-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Signing in..." } else { "Sign In" }}
                    </button>
                </form>
                <Show when=move || info.get().is_some()>
                    <p class="auth-message auth-message--error">{move || info.get().unwrap_or_default()}</p>
                </Show>
                <div class="auth-links">
                    <A href="/forgot-password">"Forgot password?"</A>
                    <A href="/signup">"Create an account"</A>
                </div>
            </div>
        </div>
    }
}
