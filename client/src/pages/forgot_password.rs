//! Password reset request form.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use portal::flow::reset::ResetFlow;
use portal::util::liveness::Liveness;

use crate::app::Portal;
use crate::util::navigation::follow_step;

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let navigate = use_navigate();
    let flow: Arc<ResetFlow> = portal.reset_flow();
    let state = RwSignal::new(flow.state());

    let email = RwSignal::new(String::new());
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
        let email_value = email.get_untracked();
        leptos::task::spawn_local(async move {
            let result = flow.request(&email_value).await;
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

    let error = move || state.with(|s| s.error.clone());
    let message = move || state.with(|s| s.message.clone());

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Forgot Password"</h1>
                <p class="auth-card__subtitle">"We will email you a code to reset your password"</p>
                <form class="auth-form" on:submit=on_submit>
                    <input
                        class="auth-input"
                        type="email"
                        placeholder="you@pec.edu.in"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <button class="auth-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Sending..." } else { "Send Reset Code" }}
                    </button>
                </form>
                <Show when=move || error().is_some()>
                    <p class="auth-message auth-message--error">{move || error().unwrap_or_default()}</p>
                </Show>
                <Show when=move || message().is_some()>
                    <p class="auth-message">{move || message().unwrap_or_default()}</p>
                </Show>
                <div class="auth-links">
                    <A href="/login">"Back to sign in"</A>
                </div>
            </div>
        </div>
    }
}
