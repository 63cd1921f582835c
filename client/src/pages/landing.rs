//! Public landing page shown at `/` to signed-out visitors.

use leptos::prelude::*;

#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <div class="landing-page">
            <header class="landing-page__hero">
                <h1>"Academic Portal"</h1>
                <p>"Courses, study materials and practice quizzes in one place."</p>
            </header>
            <div class="landing-page__actions">
                <a href="/login" class="auth-button">"Sign In"</a>
                <a href="/signup" class="auth-button auth-button--secondary">"Sign Up"</a>
            </div>
        </div>
    }
}
