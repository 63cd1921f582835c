//! Signup form. A successful submit caches the email for this tab and moves
//! on to OTP verification after a short pause.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use portal::flow::signup::{SignupFlow, SignupState};
use portal::util::liveness::Liveness;

use crate::app::Portal;
use crate::util::navigation::follow_step;

#[component]
pub fn SignupPage() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let navigate = use_navigate();
    let flow: Arc<SignupFlow> = portal.signup_flow();
    let state = RwSignal::new(flow.state());

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let liveness = Liveness::new();
    {
        let liveness = liveness.clone();
        let flow = flow.clone();
        on_cleanup(move || {
            liveness.kill();
            flow.teardown();
        });
    }

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        busy.set(true);

        let flow = flow.clone();
        let navigate = navigate.clone();
        let liveness = liveness.clone();
        let (name_value, email_value, password_value) =
            (name.get_untracked(), email.get_untracked(), password.get_untracked());
        leptos::task::spawn_local(async move {
            let result = flow.submit_form(&name_value, &email_value, &password_value).await;
            if !liveness.is_alive() {
                return;
            }
            busy.set(false);
            state.set(flow.state());
            if let Ok(step) = result {
                follow_step(&step, liveness, navigate);
            }
        });
    };

    let error = move || state.with(|s: &SignupState| s.error.clone());
    let message = move || state.with(|s: &SignupState| s.message.clone());

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Create Account"</h1>
                <p class="auth-card__subtitle">"Use your @pec.edu.in email address"</p>
                <form class="auth-form" on:submit=on_submit>
                    <input
                        class="auth-input"
                        type="text"
                        placeholder="Full name"
                        prop:value=move || name.get()
                        on:input=move |ev| name.set(event_target_value(&ev))
                    />
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
                        {move || if busy.get() { "Creating account..." } else { "Sign Up" }}
                    </button>
                </form>
                <Show when=move || error().is_some()>
                    <p class="auth-message auth-message--error">{move || error().unwrap_or_default()}</p>
                </Show>
                <Show when=move || message().is_some()>
                    <p class="auth-message">{move || message().unwrap_or_default()}</p>
                </Show>
                <div class="auth-links">
                    <A href="/login">"Already have an account? Sign in"</A>
                </div>
            </div>
        </div>
    }
}
