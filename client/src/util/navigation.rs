//! Turning flow outcomes into router navigation.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use std::time::Duration;

use leptos_router::NavigateOptions;
use portal::flow::FlowStep;
use portal::util::liveness::Liveness;

use super::timing::sleep;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    None,
    Now(String),
    After(String, Duration),
}

#[must_use]
pub fn navigation_for(step: &FlowStep) -> Navigation {
    match step {
        FlowStep::Stay | FlowStep::Discarded => Navigation::None,
        FlowStep::Redirect(route) => Navigation::Now(route.path().to_owned()),
        FlowStep::RedirectAfter { route, delay } => Navigation::After(route.path().to_owned(), *delay),
    }
}

/// Apply a flow step. Delayed redirects are dropped if the page unmounts
/// while waiting.
pub fn follow_step<F>(step: &FlowStep, liveness: Liveness, navigate: F)
where
    F: Fn(&str, NavigateOptions) + 'static,
{
    match navigation_for(step) {
        Navigation::None => {}
        Navigation::Now(path) => navigate(&path, NavigateOptions::default()),
        Navigation::After(path, delay) => {
            leptos::task::spawn_local(async move {
                sleep(delay).await;
                if liveness.is_alive() {
                    navigate(&path, NavigateOptions::default());
                } else {
                    leptos::logging::log!("redirect to {path} dropped after unmount");
                }
            });
        }
    }
}
