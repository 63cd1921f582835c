//! Dashboard page with profile, course, material, quiz and user panels.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the authenticated landing route. The guard keeps signed-out users
//! away, so the page assumes a session; panels load their own data on mount.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use portal::state::route_guard::AppRoute;

use crate::app::Portal;
use crate::components::course_panel::CoursePanel;
use crate::components::material_panel::MaterialPanel;
use crate::components::mcq_panel::McqPanel;
use crate::components::profile_card::ProfileCard;
use crate::components::user_panel::UserPanel;
use crate::state::auth::AuthState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashboardTab {
    Profile,
    Courses,
    Materials,
    Quiz,
    Users,
}

impl DashboardTab {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Courses => "Courses",
            Self::Materials => "Study Materials",
            Self::Quiz => "Practice Quiz",
            Self::Users => "Users",
        }
    }
}

/// Tabs visible to the signed-in user; the user table is admin-only.
#[must_use]
pub fn tabs_for(is_admin: bool) -> Vec<DashboardTab> {
    let mut tabs = vec![DashboardTab::Profile, DashboardTab::Courses, DashboardTab::Materials, DashboardTab::Quiz];
    if is_admin {
        tabs.push(DashboardTab::Users);
    }
    tabs
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let auth = expect_context::<RwSignal<AuthState>>();
    let navigate = use_navigate();
    let tab = RwSignal::new(DashboardTab::Profile);

    // Losing admin rights mid-session hides the users tab.
    Effect::new(move || {
        if !tabs_for(auth.get().is_admin()).contains(&tab.get_untracked()) {
            tab.set(DashboardTab::Profile);
        }
    });

    let on_logout = move |_| {
        if portal.session.logout() {
            navigate(AppRoute::Login.path(), NavigateOptions::default());
        }
    };

    view! {
        <div class="dashboard-page">
            <header class="dashboard-page__header toolbar">
                <span class="toolbar__title">"Academic Portal"</span>
                <span class="toolbar__divider" aria-hidden="true"></span>
                <nav class="toolbar__tabs">
                    {move || {
                        tabs_for(auth.get().is_admin())
                            .into_iter()
                            .map(|t| {
                                view! {
                                    <button
                                        class="btn toolbar__tab"
                                        class:toolbar__tab--active=move || tab.get() == t
                                        on:click=move |_| tab.set(t)
                                    >
                                        {t.label()}
                                    </button>
                                }
                            })
                            .collect_view()
                    }}
                </nav>

                <span class="toolbar__spacer"></span>

                <span class="toolbar__self">
                    {move || auth.get().display_name()}
                    <Show when=move || auth.get().is_admin()>
                        <span class="toolbar__self-role">" (admin)"</span>
                    </Show>
                </span>

                <button class="btn toolbar__logout" on:click=on_logout title="Logout">
                    "Logout"
                </button>
            </header>

            <main class="dashboard-page__body">
                {move || match tab.get() {
                    DashboardTab::Profile => view! { <ProfileCard/> }.into_any(),
                    DashboardTab::Courses => view! { <CoursePanel/> }.into_any(),
                    DashboardTab::Materials => view! { <MaterialPanel/> }.into_any(),
                    DashboardTab::Quiz => view! { <McqPanel/> }.into_any(),
                    DashboardTab::Users => view! { <UserPanel/> }.into_any(),
                }}
            </main>
        </div>
    }
}
