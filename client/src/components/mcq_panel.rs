//! Practice quiz: generate questions for a course and score answers locally.
//!
//! SYSTEM CONTEXT
//! ==============
//! Generation can take up to thirty seconds and has no cancel; the panel just
//! stays busy. Answers and scoring never leave the browser.

#[cfg(test)]
#[path = "mcq_panel_test.rs"]
mod mcq_panel_test;

use leptos::prelude::*;
use portal::mcq::{Quiz, build_request};
use portal::net::types::Course;
use portal::util::liveness::Liveness;

use crate::app::Portal;

/// CSS class for one answer choice; correctness is revealed after submit.
#[must_use]
pub fn option_class(quiz: &Quiz, question: usize, option: usize) -> &'static str {
    let picked = quiz.answer(question) == Some(option);
    if !quiz.is_submitted() {
        return if picked { "mcq-option mcq-option--selected" } else { "mcq-option" };
    }
    let correct = quiz
        .questions()
        .get(question)
        .and_then(|q| q.options.get(option))
        .is_some_and(|o| o.correct);
    match (picked, correct) {
        (_, true) => "mcq-option mcq-option--correct",
        (true, false) => "mcq-option mcq-option--wrong",
        (false, false) => "mcq-option",
    }
}

#[component]
pub fn McqPanel() -> impl IntoView {
    let portal = expect_context::<Portal>();
    let courses = RwSignal::new(Vec::<Course>::new());
    let course_id = RwSignal::new(String::new());
    let topics = RwSignal::new(String::new());
    let quiz = RwSignal::new(None::<Quiz>);
    let busy = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let liveness = Liveness::new();
    let cleanup = liveness.clone();
    on_cleanup(move || cleanup.kill());

    {
        let session = portal.session.clone();
        let liveness = liveness.clone();
        leptos::task::spawn_local(async move {
            let result = session.api().list_courses().await;
            if liveness.is_alive() {
                match result {
                    Ok(list) => courses.set(list),
                    Err(e) => error.set(Some(e.user_message())),
                }
            }
        });
    }

    let on_generate = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let request = match build_request(&course_id.get_untracked(), &topics.get_untracked()) {
            Ok(request) => request,
            Err(e) => {
                error.set(Some(e.user_message()));
                return;
            }
        };
        busy.set(true);
        error.set(None);
        quiz.set(None);
        let session = portal.session.clone();
        let liveness = liveness.clone();
        leptos::task::spawn_local(async move {
            let result = session.api().generate_mcq(&request).await;
            if !liveness.is_alive() {
                return;
            }
            busy.set(false);
            match result {
                Ok(questions) if questions.is_empty() => {
                    error.set(Some("No questions were generated. Try different topics.".to_owned()));
                }
                Ok(questions) => quiz.set(Some(Quiz::new(questions))),
                Err(e) => error.set(Some(e.user_message())),
            }
        });
    };

    let on_submit_quiz = move |_| {
        quiz.update(|q| {
            if let Some(q) = q {
                q.submit();
            }
        });
    };

    view! {
        <section class="panel mcq-panel">
            <h2 class="panel__title">"Practice Quiz"</h2>
            <form class="panel__form" on:submit=on_generate>
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
                <input
                    class="panel__input"
                    type="text"
                    placeholder="Topics, comma separated"
                    prop:value=move || topics.get()
                    on:input=move |ev| topics.set(event_target_value(&ev))
                />
                <button class="btn" type="submit" disabled=move || busy.get()>
                    {move || if busy.get() { "Generating (up to 30 seconds)..." } else { "Generate quiz" }}
                </button>
            </form>

            <Show when=move || error.get().is_some()>
                <p class="panel__error">{move || error.get().unwrap_or_default()}</p>
            </Show>

            {move || {
                quiz.get()
                    .map(|current| {
                        let submitted = current.is_submitted();
                        let result = current.score();
                        let total = current.questions().len();
                        let answered = current.answered();
                        let items = current
                            .questions()
                            .iter()
                            .enumerate()
                            .map(|(qi, question)| {
                                let options = question
                                    .options
                                    .iter()
                                    .enumerate()
                                    .map(|(oi, option)| {
                                        view! {
                                            <li>
                                                <button
                                                    class=option_class(&current, qi, oi)
                                                    disabled=submitted
                                                    on:click=move |_| quiz.update(|q| {
                                                        if let Some(q) = q {
                                                            q.select(qi, oi);
                                                        }
                                                    })
                                                >
                                                    {option.text.clone()}
                                                </button>
                                            </li>
                                        }
                                    })
                                    .collect_view();
                                let explanation = question.explanation.clone().filter(|_| submitted);
                                view! {
                                    <li class="mcq-question">
                                        <p class="mcq-question__text">{format!("{}. {}", qi + 1, question.question)}</p>
                                        <ul class="mcq-question__options">{options}</ul>
                                        {explanation.map(|text| view! { <p class="mcq-question__explanation">{text}</p> })}
                                    </li>
                                }
                            })
                            .collect_view();
                        view! {
                            <div class="mcq-quiz">
                                <ol class="mcq-quiz__questions">{items}</ol>
                                <Show
                                    when=move || submitted
                                    fallback=move || {
                                        view! {
                                            <button class="btn" on:click=on_submit_quiz>
                                                {format!("Submit ({answered}/{total} answered)")}
                                            </button>
                                        }
                                    }
                                >
                                    <p class="mcq-quiz__score">
                                        {format!("Score: {}/{} ({}%)", result.correct, result.total, result.percentage)}
                                    </p>
                                </Show>
                            </div>
                        }
                    })
            }}
        </section>
    }
}
