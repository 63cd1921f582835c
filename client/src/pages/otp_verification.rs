//! OTP entry for a pending signup.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reachable only after a signup submit in this tab: without the cached email
//! the page sends the user straight back to `/signup`. A one-second ticker
//! drives the resend countdown and stops when the page unmounts.

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use portal::flow::FlowStep;
use portal::flow::signup::{SignupFlow, SignupPhase};
use portal::util::liveness::Liveness;

use crate::app::Portal;
use crate::util::navigation::follow_step;
use crate::util::timing::spawn_ticker;

#[component]
pub fn OtpVerificationPage() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let navigate = use_navigate();
    let flow: Arc<SignupFlow> = portal.signup_flow();
    let liveness = Liveness::new();

    let entry = flow.enter_verification();
    let state = RwSignal::new(flow.state());
    if entry != FlowStep::Stay {
        follow_step(&entry, liveness.clone(), navigate.clone());
    }

    let code = RwSignal::new(String::new());
    let verifying = RwSignal::new(false);
    let resending = RwSignal::new(false);
    let code_length = flow.code_length();

    {
        let flow = flow.clone();
        spawn_ticker(liveness.clone(), move || {
            flow.tick();
            state.set(flow.state());
            true
        });
    }
    {
        let liveness = liveness.clone();
        let flow = flow.clone();
        on_cleanup(move || {
            liveness.kill();
            flow.teardown();
        });
    }

    let verify_flow = flow.clone();
    let verify_liveness = liveness.clone();
    let verify_navigate = navigate.clone();
    let on_verify = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if verifying.get_untracked() {
            return;
        }
        verifying.set(true);

        let flow = verify_flow.clone();
        let liveness = verify_liveness.clone();
        let navigate = verify_navigate.clone();
        let code_value = code.get_untracked();
        leptos::task::spawn_local(async move {
            let result = flow.submit_code(&code_value).await;
            if !liveness.is_alive() {
                return;
            }
            verifying.set(false);
            state.set(flow.state());
            if let Ok(step) = result {
                follow_step(&step, liveness, navigate);
            }
        });
    };

    let resend_flow = flow.clone();
    let resend_liveness = liveness.clone();
    let on_resend = move |_| {
        if resending.get_untracked() {
            return;
        }
        resending.set(true);

        let flow = resend_flow.clone();
        let liveness = resend_liveness.clone();
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            let result = flow.resend().await;
            if !liveness.is_alive() {
                return;
            }
            resending.set(false);
            state.set(flow.state());
            if let Ok(step) = result {
                follow_step(&step, liveness, navigate);
            }
        });
    };

    let abandon_flow = flow;
    let on_abandon = move |_| abandon_flow.abandon();

    let can_resend = move || state.with(|s| s.countdown.can_resend()) && !resending.get();
    let verified = move || state.with(|s| s.phase == SignupPhase::Verified);
    let error = move || state.with(|s| s.error.clone());
    let message = move || state.with(|s| s.message.clone());

    view! {
        <div class="auth-page">
            <div class="auth-card">
                <h1>"Verify Your Email"</h1>
                <p class="auth-card__subtitle">
                    "Enter the code sent to "
                    <strong>{move || state.with(|s| s.email.clone().unwrap_or_default())}</strong>
                </p>
                <form class="auth-form" on:submit=on_verify>
                    <input
                        class="auth-input auth-input--code"
                        type="text"
                        inputmode="numeric"
                        maxlength=code_length.to_string()
                        placeholder="Enter OTP"
                        prop:value=move || code.get()
                        on:input=move |ev| {
                            let digits: String = event_target_value(&ev).chars().filter(char::is_ascii_digit).collect();
                            code.set(digits);
                        }
                    />
                    <button class="auth-button" type="submit" disabled=move || verifying.get() || verified()>
                        {move || if verifying.get() { "Verifying..." } else { "Verify" }}
                    </button>
                </form>
                <div class="auth-resend">
                    <button class="auth-link-button" on:click=on_resend disabled=move || !can_resend()>
                        {move || {
                            if can_resend() {
                                "Resend OTP".to_owned()
                            } else {
                                format!("Resend available in {}", state.with(|s| s.countdown.label()))
                            }
                        }}
                    </button>
                </div>
                <Show when=move || error().is_some()>
                    <p class="auth-message auth-message--error">{move || error().unwrap_or_default()}</p>
                </Show>
                <Show when=move || message().is_some()>
                    <p class="auth-message">{move || message().unwrap_or_default()}</p>
                </Show>
                <div class="auth-links">
                    <a href="/signup" on:click=on_abandon>"Use a different email"</a>
                </div>
            </div>
        </div>
    }
}
