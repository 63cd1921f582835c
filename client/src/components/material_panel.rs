//! Study materials: list, download, and admin upload, rename and delete.

#[cfg(test)]
#[path = "material_panel_test.rs"]
mod material_panel_test;

use leptos::html;
use leptos::prelude::*;
use portal::net::types::{Course, Material, MaterialUpdate, MaterialUpload};
use portal::util::liveness::Liveness;

use crate::app::Portal;
use crate::state::auth::AuthState;
use crate::util::browser::{read_selected_file, save_bytes};

/// File name offered for a download.
#[must_use]
pub fn download_name(material: &Material) -> String {
    match material.file_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => format!("{}.bin", material.title.trim().replace(char::is_whitespace, "_")),
    }
}

/// Only changed, non-blank fields are sent.
#[must_use]
pub fn update_for(material: &Material, title: &str, description: &str) -> MaterialUpdate {
    let title = title.trim();
    let description = description.trim();
    MaterialUpdate {
        title: (!title.is_empty() && title != material.title).then(|| title.to_owned()),
        description: (description != material.description.as_deref().unwrap_or_default().trim())
            .then(|| description.to_owned()),
    }
}

#[component]
pub fn MaterialPanel() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let auth = expect_context::<RwSignal<AuthState>>();

    let materials = RwSignal::new(Vec::<Material>::new());
    let courses = RwSignal::new(Vec::<Course>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);
    let notice = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let title = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let course_id = RwSignal::new(String::new());
    let file_input: NodeRef<html::Input> = NodeRef::new();

    let editing = RwSignal::new(None::<Material>);
    let edit_title = RwSignal::new(String::new());
    let edit_description = RwSignal::new(String::new());

    let liveness = Liveness::new();
    let cleanup = liveness.clone();
    on_cleanup(move || cleanup.kill());

    {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        leptos::task::spawn_local(async move {
            let (listed, course_list) = (session.api().list_materials().await, session.api().list_courses().await);
            if !liveness.is_alive() {
                return;
            }
            loading.set(false);
            match listed {
                Ok(list) => materials.set(list),
                Err(e) => error.set(Some(e.user_message())),
            }
            if let Ok(list) = course_list {
                courses.set(list);
            }
        });
    }

    let on_upload = {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            if busy.get_untracked() {
                return;
            }
            busy.set(true);
            error.set(None);
            notice.set(None);
            let session = session.clone();
            let liveness = liveness.clone();
            let input = file_input.get_untracked();
            let (title_value, description_value, course_value) =
                (title.get_untracked(), description.get_untracked(), course_id.get_untracked());
            leptos::task::spawn_local(async move {
                let file = read_selected_file(input).await;
                let upload =
                    MaterialUpload { title: title_value, description: description_value, course_id: course_value, file };
                let result = session.api().upload_material(upload).await;
                if !liveness.is_alive() {
                    return;
                }
                busy.set(false);
                match result {
                    Ok(material) => {
                        materials.update(|list| list.push(material));
                        title.set(String::new());
                        description.set(String::new());
                        notice.set(Some("Material uploaded".to_owned()));
                    }
                    Err(e) => error.set(Some(e.user_message())),
                }
            });
        }
    };

    let on_rename = {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            let Some(material) = editing.get_untracked() else {
                return;
            };
            let update = update_for(&material, &edit_title.get_untracked(), &edit_description.get_untracked());
            if update.to_query().is_empty() {
                editing.set(None);
                return;
            }
            let session = session.clone();
            let liveness = liveness.clone();
            leptos::task::spawn_local(async move {
                let result = session.api().update_material(material.id, &update).await;
                if !liveness.is_alive() {
                    return;
                }
                match result {
                    Ok(updated) => {
                        materials.update(|list| {
                            if let Some(slot) = list.iter_mut().find(|m| m.id == updated.id) {
                                *slot = updated;
                            }
                        });
                        editing.set(None);
                    }
                    Err(e) => error.set(Some(e.user_message())),
                }
            });
        }
    };

    let on_download = {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        move |material: Material| {
            let session = session.clone();
            let liveness = liveness.clone();
            leptos::task::spawn_local(async move {
                let result = session.api().download_material(material.id).await;
                if !liveness.is_alive() {
                    return;
                }
                match result {
                    Ok(bytes) => save_bytes(&download_name(&material), &bytes),
                    Err(e) => error.set(Some(e.user_message())),
                }
            });
        }
    };

    let on_delete = {
        let session = portal.session.clone();
        move |id: i64| {
            let session = session.clone();
            let liveness = liveness.clone();
            leptos::task::spawn_local(async move {
                let result = session.api().delete_material(id).await;
                if !liveness.is_alive() {
                    return;
                }
                match result {
                    Ok(()) => materials.update(|list| list.retain(|m| m.id != id)),
                    Err(e) => error.set(Some(e.user_message())),
                }
            });
        }
    };

    let course_label = move |id: Option<String>| {
        let id = id.unwrap_or_default();
        courses.with(|list| {
            list.iter()
                .find(|c| c.id.to_string() == id)
                .map_or_else(|| id.clone(), |c| format!("{} - {}", c.course_code, c.course_name))
        })
    };

    view! {
        <section class="panel material-panel">
            <h2 class="panel__title">"Study Materials"</h2>

            <Show when=move || auth.get().is_admin()>
                <form class="panel__form" on:submit=on_upload.clone()>
                    <input
                        class="panel__input"
                        type="text"
                        placeholder="Title"
                        prop:value=move || title.get()
                        on:input=move |ev| title.set(event_target_value(&ev))
                    />
                    <textarea
                        class="panel__input"
                        placeholder="Description"
                        prop:value=move || description.get()
                        on:input=move |ev| description.set(event_target_value(&ev))
                    ></textarea>
                    <select class="panel__input" on:change=move |ev| course_id.set(event_target_value(&ev))>
                        <option value="">"Select a course"</option>
                        {move || {
                            courses
                                .get()
                                .into_iter()
                                .map(|c| {
                                    view! {
                                        <option value=c.id.to_string()>
                                            {format!("{} - {}", c.course_code, c.course_name)}
                                        </option>
                                    }
                                })
                                .collect_view()
                        }}
                    </select>
                    <input class="panel__input" type="file" node_ref=file_input/>
                    <button class="btn" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Uploading..." } else { "Upload" }}
                    </button>
                </form>
            </Show>

            <Show when=move || editing.get().is_some()>
                <form class="panel__form panel__form--inline" on:submit=on_rename.clone()>
                    <input
                        class="panel__input"
                        type="text"
                        prop:value=move || edit_title.get()
                        on:input=move |ev| edit_title.set(event_target_value(&ev))
                    />
                    <input
                        class="panel__input"
                        type="text"
                        prop:value=move || edit_description.get()
                        on:input=move |ev| edit_description.set(event_target_value(&ev))
                    />
                    <button class="btn" type="submit">"Save"</button>
                    <button class="btn btn--secondary" type="button" on:click=move |_| editing.set(None)>
                        "Cancel"
                    </button>
                </form>
            </Show>

            <Show when=move || error.get().is_some()>
                <p class="panel__error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            <Show when=move || notice.get().is_some()>
                <p class="panel__notice">{move || notice.get().unwrap_or_default()}</p>
            </Show>
            <Show when=move || !loading.get() fallback=|| view! { <p>"Loading materials..."</p> }>
                <ul class="material-panel__list">
                    {
                        let on_download = on_download.clone();
                        let on_delete = on_delete.clone();
                        move || {
                            materials
                                .get()
                                .into_iter()
                                .map(|material| {
                                    let id = material.id;
                                    let on_download = on_download.clone();
                                    let on_delete = on_delete.clone();
                                    let for_edit = material.clone();
                                    let for_download = material.clone();
                                    view! {
                                        <li class="material-panel__item">
                                            <div class="material-panel__meta">
                                                <strong>{material.title.clone()}</strong>
                                                <span>{course_label(material.course_id.clone())}</span>
                                                <p>{material.description.clone().unwrap_or_default()}</p>
                                            </div>
                                            <button
                                                class="btn btn--small"
                                                on:click=move |_| on_download(for_download.clone())
                                            >
                                                "Download"
                                            </button>
                                            <Show when=move || auth.get().is_admin()>
                                                <button
                                                    class="btn btn--small"
                                                    on:click={
                                                        let for_edit = for_edit.clone();
                                                        move |_| {
                                                            edit_title.set(for_edit.title.clone());
                                                            edit_description
                                                                .set(for_edit.description.clone().unwrap_or_default());
                                                            editing.set(Some(for_edit.clone()));
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
                                        </li>
                                    }
                                })
                                .collect_view()
                        }
                    }
                </ul>
            </Show>
        </section>
    }
}
