//! Course list with search, plus admin create, edit and delete.
//!
//! SYSTEM CONTEXT
//! ==============
//! Loads `/api/courses/admin/all` on mount. Students get the read-only table;
//! admins also get the course form. Search filtering happens client-side.

#[cfg(test)]
#[path = "course_panel_test.rs"]
mod course_panel_test;

use leptos::prelude::*;
use portal::filters::filter_courses;
use portal::net::types::{Course, CourseDraft};
use portal::util::liveness::Liveness;

use crate::app::Portal;
use crate::state::auth::AuthState;

/// Prefill the form from an existing course.
#[must_use]
pub fn draft_from_course(course: &Course) -> CourseDraft {
    CourseDraft {
        course_code: course.course_code.clone(),
        course_name: course.course_name.clone(),
        description: course.description.clone().unwrap_or_default(),
        department: course.department.clone(),
        semester: course.semester.unwrap_or(1),
        batch_year: course.batch_year.clone().unwrap_or_default(),
    }
}

#[component]
pub fn CoursePanel() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let auth = expect_context::<RwSignal<AuthState>>();

    let courses = RwSignal::new(Vec::<Course>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let search = RwSignal::new(String::new());
    let draft = RwSignal::new(CourseDraft { semester: 1, ..CourseDraft::default() });
    let editing = RwSignal::new(None::<i64>);
    let busy = RwSignal::new(false);

    let liveness = Liveness::new();
    let cleanup = liveness.clone();
    on_cleanup(move || cleanup.kill());

    let reload = {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        move || {
            let session = session.clone();
            let liveness = liveness.clone();
            loading.set(true);
            leptos::task::spawn_local(async move {
                let result = session.api().list_courses().await;
                if !liveness.is_alive() {
                    return;
                }
                loading.set(false);
                match result {
                    Ok(list) => courses.set(list),
                    Err(e) => error.set(Some(e.user_message())),
                }
            });
        }
    };
    reload();

    let on_save = {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        let reload = reload.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            if busy.get_untracked() {
                return;
            }
            busy.set(true);
            error.set(None);
            let session = session.clone();
            let liveness = liveness.clone();
            let reload = reload.clone();
            let body = draft.get_untracked();
            let target = editing.get_untracked();
            leptos::task::spawn_local(async move {
                let result = match target {
                    Some(id) => session.api().update_course(id, &body).await,
                    None => session.api().create_course(&body).await,
                };
                if !liveness.is_alive() {
                    return;
                }
                busy.set(false);
                match result {
                    Ok(_) => {
                        editing.set(None);
                        draft.set(CourseDraft { semester: 1, ..CourseDraft::default() });
                        reload();
                    }
                    Err(e) => error.set(Some(e.user_message())),
                }
            });
        }
    };

    let on_delete = {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        move |id: i64| {
            let session = session.clone();
            let liveness = liveness.clone();
            leptos::task::spawn_local(async move {
                let result = session.api().delete_course(id).await;
                if !liveness.is_alive() {
                    return;
                }
                match result {
                    Ok(()) => courses.update(|list| list.retain(|c| c.id != id)),
                    Err(e) => error.set(Some(e.user_message())),
                }
            });
        }
    };

    let visible = move || {
        let query = search.get();
        courses.with(|list| filter_courses(list, &query).into_iter().cloned().collect::<Vec<_>>())
    };

    let text_input = move |placeholder: &'static str, get: fn(&CourseDraft) -> String, set: fn(&mut CourseDraft, String)| {
        view! {
            <input
                class="panel__input"
                type="text"
                placeholder=placeholder
                prop:value=move || draft.with(get)
                on:input=move |ev| draft.update(|d| set(d, event_target_value(&ev)))
            />
        }
    };

    view! {
        <section class="panel course-panel">
            <h2 class="panel__title">"Courses"</h2>
            <input
                class="panel__search"
                type="search"
                placeholder="Search by code, name or department"
                prop:value=move || search.get()
                on:input=move |ev| search.set(event_target_value(&ev))
            />

            <Show when=move || auth.get().is_admin()>
                <form class="panel__form" on:submit=on_save.clone()>
                    {text_input("Course code", |d| d.course_code.clone(), |d, v| d.course_code = v)}
                    {text_input("Course name", |d| d.course_name.clone(), |d, v| d.course_name = v)}
                    {text_input("Department", |d| d.department.clone(), |d, v| d.department = v)}
                    {text_input("Batch year", |d| d.batch_year.clone(), |d, v| d.batch_year = v)}
                    <input
                        class="panel__input"
                        type="number"
                        min="1"
                        max="8"
                        prop:value=move || draft.with(|d| d.semester.to_string())
                        on:input=move |ev| {
                            if let Ok(semester) = event_target_value(&ev).parse::<u32>() {
                                draft.update(|d| d.semester = semester);
                            }
                        }
                    />
                    <textarea
                        class="panel__input"
                        placeholder="Description"
                        prop:value=move || draft.with(|d| d.description.clone())
                        on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                    ></textarea>
                    <button class="btn" type="submit" disabled=move || busy.get()>
                        {move || if editing.get().is_some() { "Update course" } else { "Add course" }}
                    </button>
                    <Show when=move || editing.get().is_some()>
                        <button
                            class="btn btn--secondary"
                            type="button"
                            on:click=move |_| {
                                editing.set(None);
                                draft.set(CourseDraft { semester: 1, ..CourseDraft::default() });
                            }
                        >
                            "Cancel"
                        </button>
                    </Show>
                </form>
            </Show>

            <Show when=move || error.get().is_some()>
                <p class="panel__error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            <Show when=move || !loading.get() fallback=|| view! { <p>"Loading courses..."</p> }>
                <table class="panel__table">
                    <thead>
                        <tr>
                            <th>"Code"</th>
                            <th>"Name"</th>
                            <th>"Department"</th>
                            <th>"Semester"</th>
                            <th>"Batch"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        {
                            let on_delete = on_delete.clone();
                            move || {
                                visible()
                                    .into_iter()
                                    .map(|course| {
                                        let id = course.id;
                                        let on_delete = on_delete.clone();
                                        let prefill = draft_from_course(&course);
                                        view! {
                                            <tr>
                                                <td>{course.course_code.clone()}</td>
                                                <td>{course.course_name.clone()}</td>
                                                <td>{course.department.clone()}</td>
                                                <td>{course.semester.map(|s| s.to_string()).unwrap_or_default()}</td>
                                                <td>{course.batch_year.clone().unwrap_or_default()}</td>
                                                <td>
                                                    <Show when=move || auth.get().is_admin()>
                                                        <button
                                                            class="btn btn--small"
                                                            on:click={
                                                                let prefill = prefill.clone();
                                                                move |_| {
                                                                    editing.set(Some(id));
                                                                    draft.set(prefill.clone());
                                                                }
                                                            }
                                                        >
                                                            "Edit"
                                                        </button>
                                                        <button
                                                            class="btn btn--small btn--danger"
                                                            on:click={
                                                                let on_delete = on_delete.clone();
                                                                move |_| on_delete(id)
                                                            }
                                                        >
                                                            "Delete"
                                                        </button>
                                                    </Show>
                                                </td>
                                            </tr>
                                        }
                                    })
                                    .collect_view()
                            }
                        }
                    </tbody>
                </table>
            </Show>
        </section>
    }
}
