use super::*;
use crate::net::types::McqOption;

fn question(correct: usize, options: usize) -> McqQuestion {
    McqQuestion {
        question: format!("q{correct}"),
        options: (0..options)
            .map(|i| McqOption { text: format!("o{i}"), correct: i == correct })
            .collect(),
        explanation: None,
    }
}

#[test]
fn topics_split_on_commas() {
    assert_eq!(parse_topics(" trees, graphs ,, heaps ").unwrap(), vec!["trees", "graphs", "heaps"]);
}

#[test]
fn empty_topics_rejected() {
    assert_eq!(parse_topics(" , ,"), Err(PortalError::validation("Please enter at least one topic")));
}

#[test]
fn request_always_asks_for_fifteen() {
    let request = build_request("3", "sorting").unwrap();
    assert_eq!(request.number_of_questions, 15);
    assert_eq!(request.course_id, "3");
    assert!(build_request(" ", "sorting").is_err());
}

#[test]
fn score_rounds_percentage() {
    let questions = vec![question(0, 4), question(1, 4), question(2, 4)];
    let result = score(&questions, &[Some(0), Some(1), Some(3)]);
    assert_eq!(result, Score { correct: 2, total: 3, percentage: 67 });

    let result = score(&questions, &[Some(0)]);
    assert_eq!(result, Score { correct: 1, total: 3, percentage: 33 });
}

#[test]
fn score_of_empty_quiz_is_zero() {
    assert_eq!(score(&[], &[]), Score { correct: 0, total: 0, percentage: 0 });
}

#[test]
fn quiz_ignores_changes_after_submit() {
    let mut quiz = Quiz::new(vec![question(1, 2), question(0, 2)]);
    quiz.select(0, 1);
    quiz.select(1, 5);
    assert_eq!(quiz.answered(), 1);
    assert_eq!(quiz.answer(1), None);

    let result = quiz.submit();
    assert_eq!(result.percentage, 50);

    quiz.select(1, 0);
    assert_eq!(quiz.answer(1), None);
    assert!(quiz.is_submitted());
}
