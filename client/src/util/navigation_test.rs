use portal::state::route_guard::AppRoute;

use super::*;

#[test]
fn stay_and_discarded_do_not_navigate() {
    assert_eq!(navigation_for(&FlowStep::Stay), Navigation::None);
    assert_eq!(navigation_for(&FlowStep::Discarded), Navigation::None);
}

#[test]
fn redirect_maps_to_route_path() {
    assert_eq!(
        navigation_for(&FlowStep::Redirect(AppRoute::Signup)),
        Navigation::Now("/signup".to_owned())
    );
}

#[test]
fn delayed_redirect_keeps_delay() {
    let step = FlowStep::RedirectAfter { route: AppRoute::Login, delay: Duration::from_millis(1500) };
    assert_eq!(navigation_for(&step), Navigation::After("/login".to_owned(), Duration::from_millis(1500)));
}
