use super::*;

#[test]
fn students_do_not_see_users_tab() {
    let tabs = tabs_for(false);
    assert_eq!(tabs.len(), 4);
    assert!(!tabs.contains(&DashboardTab::Users));
}

#[test]
fn admins_see_users_tab_last() {
    let tabs = tabs_for(true);
    assert_eq!(tabs.last(), Some(&DashboardTab::Users));
}

#[test]
fn tab_labels_are_distinct() {
    let labels: std::collections::HashSet<&str> = tabs_for(true).into_iter().map(DashboardTab::label).collect();
    assert_eq!(labels.len(), tabs_for(true).len());
}
