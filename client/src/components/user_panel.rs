//! Admin user directory with search and dropdown filters.

use leptos::prelude::*;
use portal::filters::{UserFilter, distinct_values};
use portal::net::types::{Role, User};
use portal::util::liveness::Liveness;

use crate::app::Portal;

fn parse_role(value: &str) -> Option<Role> {
    match value {
        "ADMIN" => Some(Role::Admin),
        "STUDENT" => Some(Role::Student),
        _ => None,
    }
}

fn non_blank(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

#[component]
pub fn UserPanel() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let users = RwSignal::new(Vec::<User>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let filter = RwSignal::new(UserFilter::default());

    let liveness = Liveness::new();
    {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        leptos::task::spawn_local(async move {
            let result = session.api().list_users().await;
            if !liveness.is_alive() {
                return;
            }
            loading.set(false);
            match result {
                Ok(list) => users.set(list),
                Err(e) => error.set(Some(e.user_message())),
            }
        });
    }
    on_cleanup(move || liveness.kill());

    let departments = move || users.with(|list| distinct_values(list.iter().map(|u| u.department.as_deref())));
    let batches = move || users.with(|list| distinct_values(list.iter().map(|u| u.batch_year.as_deref())));
    let visible = move || {
        let criteria = filter.get();
        users.with(|list| criteria.apply(list).into_iter().cloned().collect::<Vec<_>>())
    };

    view! {
        <section class="panel user-panel">
            <h2 class="panel__title">"Users"</h2>
            <div class="panel__filters">
                <input
                    class="panel__search"
                    type="search"
                    placeholder="Search by name or email"
                    prop:value=move || filter.with(|f| f.search.clone())
                    on:input=move |ev| filter.update(|f| f.search = event_target_value(&ev))
                />
                <select class="panel__input" on:change=move |ev| filter.update(|f| f.department = non_blank(event_target_value(&ev)))>
                    <option value="">"All departments"</option>
                    {move || departments().into_iter().map(|d| view! { <option value=d.clone()>{d.clone()}</option> }).collect_view()}
                </select>
                <select class="panel__input" on:change=move |ev| filter.update(|f| f.batch_year = non_blank(event_target_value(&ev)))>
                    <option value="">"All batches"</option>
                    {move || batches().into_iter().map(|b| view! { <option value=b.clone()>{b.clone()}</option> }).collect_view()}
                </select>
                <select class="panel__input" on:change=move |ev| filter.update(|f| f.role = parse_role(&event_target_value(&ev)))>
                    <option value="">"All roles"</option>
                    <option value="STUDENT">"Student"</option>
                    <option value="ADMIN">"Admin"</option>
                </select>
            </div>

            <Show when=move || error.get().is_some()>
                <p class="panel__error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            <Show when=move || !loading.get() fallback=|| view! { <p>"Loading users..."</p> }>
                <p class="panel__summary">{move || format!("{} of {} users", visible().len(), users.with(Vec::len))}</p>
                <table class="panel__table">
                    <thead>
                        <tr>
                            <th>"Name"</th>
                            <th>"Email"</th>
                            <th>"Role"</th>
                            <th>"Department"</th>
                            <th>"Batch"</th>
                            <th>"Semester"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            visible()
                                .into_iter()
                                .map(|user| {
                                    view! {
                                        <tr>
                                            <td>{user.name.clone()}</td>
                                            <td>{user.email.clone()}</td>
                                            <td>{if user.is_admin() { "Admin" } else { "Student" }}</td>
                                            <td>{user.department.clone().unwrap_or_default()}</td>
                                            <td>{user.batch_year.clone().unwrap_or_default()}</td>
                                            <td>{user.current_semester.map(|s| s.to_string()).unwrap_or_default()}</td>
                                        </tr>
                                    }
                                })
                                .collect_view()
                        }}
                    </tbody>
                </table>
            </Show>
        </section>
    }
}
