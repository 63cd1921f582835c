use super::*;

const POLICY: RoutePolicy = RoutePolicy { public_landing: false };

#[test]
fn no_redirect_while_loading() {
    assert_eq!(redirect_path(&AppRoute::Dashboard, GuardState::Loading, POLICY), None);
}

#[test]
fn dashboard_redirects_to_login_when_logged_out() {
    assert_eq!(
        redirect_path(&AppRoute::Dashboard, GuardState::Unauthenticated, POLICY).as_deref(),
        Some("/login")
    );
}

#[test]
fn login_redirects_to_dashboard_when_logged_in() {
    assert_eq!(
        redirect_path(&AppRoute::Login, GuardState::Authenticated, POLICY).as_deref(),
        Some("/dashboard")
    );
    assert_eq!(redirect_path(&AppRoute::Dashboard, GuardState::Authenticated, POLICY), None);
}
