//! New-password form, usable only with a ticket from the verify page.
//!
//! A reload drops the in-memory ticket; the page then shows the way back to
//! `/forgot-password` and never submits.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use portal::flow::reset::{ResetFlow, ResetPhase};
use portal::util::liveness::Liveness;

use crate::app::{Portal, ResetHandoff};
use crate::util::navigation::follow_step;

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let handoff = expect_context::<ResetHandoff>();
    let navigate = use_navigate();
    let flow: Arc<ResetFlow> = portal.reset_flow();

    let ticket = handoff.0.get_untracked();
    handoff.0.set(None);
    flow.with_ticket(ticket);
    let state = RwSignal::new(flow.state());

    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
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
        let (password_value, confirm_value) = (password.get_untracked(), confirm.get_untracked());
        leptos::task::spawn_local(async move {
            let result = flow.reset_password(&password_value, &confirm_value).await;
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

    let locked = move || state.with(|s| s.restart_required || s.phase == ResetPhase::Done);
    let restart = move || state.with(|s| s.restart_required);
    let error = move || state.with(|s| s.error.clone());
    let message = move || state.with(|s| s.message.clone());

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Reset Password"</h1>
                <p class="auth-card__subtitle">
                    {move || state.with(|s| s.email.clone().map(|e| format!("Account: {e}")).unwrap_or_default())}
                </p>
                <form class="auth-form" on:submit=on_submit>
                    <input
                        class="auth-input"
                        type="password"
                        placeholder="New password"
                        disabled=locked
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <input
                        class="auth-input"
                        type="password"
                        placeholder="Confirm new password"
                        disabled=locked
                        prop:value=move || confirm.get()
                        on:input=move |ev| confirm.set(event_target_value(&ev))
                    />
                    <button class="auth-button" type="submit" disabled=move || busy.get() || locked()>
                        {move || if busy.get() { "Resetting..." } else { "Reset Password" }}
                    </button>
                </form>
                <Show when=move || error().is_some()>
                    <p class="auth-message auth-message--error">{move || error().unwrap_or_default()}</p>
                </Show>
                <Show when=move || message().is_some()>
                    <p class="auth-message">{move || message().unwrap_or_default()}</p>
                </Show>
                <Show when=restart>
                    <div class="auth-links">
                        <A href="/forgot-password">"Request a new code"</A>
                    </div>
                </Show>
            </div>
        </div>
    }
}
