use portal::net::types::{McqOption, McqQuestion};

use super::*;

fn quiz() -> Quiz {
    Quiz::new(vec![McqQuestion {
        question: "2 + 2?".to_owned(),
        options: vec![
            McqOption { text: "3".to_owned(), correct: false },
            McqOption { text: "4".to_owned(), correct: true },
        ],
        explanation: None,
    }])
}

#[test]
fn selection_is_highlighted_before_submit() {
    let mut q = quiz();
    q.select(0, 0);
    assert_eq!(option_class(&q, 0, 0), "mcq-option mcq-option--selected");
    assert_eq!(option_class(&q, 0, 1), "mcq-option");
}

#[test]
fn submit_reveals_correct_and_wrong_choices() {
    let mut q = quiz();
    q.select(0, 0);
    q.submit();
    assert_eq!(option_class(&q, 0, 0), "mcq-option mcq-option--wrong");
    assert_eq!(option_class(&q, 0, 1), "mcq-option mcq-option--correct");
}

#[test]
fn out_of_range_option_is_plain() {
    let mut q = quiz();
    q.submit();
    assert_eq!(option_class(&q, 3, 0), "mcq-option");
}
