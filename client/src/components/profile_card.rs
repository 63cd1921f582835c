//! Signed-in user's profile with a manual refresh.

use leptos::prelude::*;
use portal::util::liveness::Liveness;

use crate::app::Portal;
use crate::state::auth::AuthState;

#[component]
pub fn ProfileCard() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let liveness = Liveness::new();
    let cleanup = liveness.clone();
    on_cleanup(move || cleanup.kill());

    let on_refresh = move |_| {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        error.set(None);
        let session = portal.session.clone();
        let liveness = liveness.clone();
        leptos::task::spawn_local(async move {
            let result = session.refresh_profile().await;
            if !liveness.is_alive() {
                return;
            }
            busy.set(false);
            if let Err(e) = result {
                error.set(Some(e.user_message()));
            }
        });
    };

    let field = move |pick: fn(&AuthState) -> Option<String>| move || pick(&auth.get()).unwrap_or_else(|| "-".to_owned());

    view! {
        <section class="panel profile-card">
            <h2 class="panel__title">{move || format!("Welcome, {}", auth.get().display_name())}</h2>
            <dl class="profile-card__fields">
                <dt>"Email"</dt>
                <dd>{field(|a| a.user.as_ref().map(|u| u.email.clone()))}</dd>
                <dt>"Role"</dt>
                <dd>{move || if auth.get().is_admin() { "Admin" } else { "Student" }}</dd>
                <dt>"Department"</dt>
                <dd>{field(|a| a.user.as_ref().and_then(|u| u.department.clone()))}</dd>
                <dt>"Batch"</dt>
                <dd>{field(|a| a.user.as_ref().and_then(|u| u.batch_year.clone()))}</dd>
                <dt>"Semester"</dt>
                <dd>{field(|a| a.user.as_ref().and_then(|u| u.current_semester).map(|s| s.to_string()))}</dd>
            </dl>
            <button class="btn" on:click=on_refresh disabled=move || busy.get()>
                {move || if busy.get() { "Refreshing..." } else { "Refresh profile" }}
            </button>
            <Show when=move || error.get().is_some()>
                <p class="panel__error">{move || error.get().unwrap_or_default()}</p>
            </Show>
        </section>
    }
}
