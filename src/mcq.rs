//! Quiz generation input and client-side scoring.
//!
//! The server generates the questions; everything here is local: turning the
//! topic field into a request, tracking the student's picks, and scoring.

#[cfg(test)]
#[path = "mcq_test.rs"]
mod mcq_test;

use crate::error::PortalError;
use crate::net::types::{GenerateMcqRequest, McqQuestion};

/// Every generated quiz has this many questions.
pub const QUESTIONS_PER_QUIZ: u32 = 15;

/// Split a comma-separated topic field, dropping blanks.
///
/// # Errors
///
/// Returns a validation error when no topic remains.
pub fn parse_topics(input: &str) -> Result<Vec<String>, PortalError> {
    let topics: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect();
    if topics.is_empty() {
        return Err(PortalError::validation("Please enter at least one topic"));
    }
    Ok(topics)
}

/// Build the generate request for a course and a raw topic field.
///
/// # Errors
///
/// Returns a validation error for a missing course or empty topics.
pub fn build_request(course_id: &str, topics: &str) -> Result<GenerateMcqRequest, PortalError> {
    let course_id = course_id.trim();
    if course_id.is_empty() {
        return Err(PortalError::validation("Please select a course"));
    }
    Ok(GenerateMcqRequest {
        course_id: course_id.to_owned(),
        topics: parse_topics(topics)?,
        number_of_questions: QUESTIONS_PER_QUIZ,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent.
    pub percentage: u32,
}

/// Score answers against questions. `answers[i]` is the chosen option index
/// for question `i`; unanswered or out-of-range picks count as wrong.
#[must_use]
pub fn score(questions: &[McqQuestion], answers: &[Option<usize>]) -> Score {
    let total = questions.len();
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| {
            answers
                .get(*i)
                .copied()
                .flatten()
                .and_then(|pick| q.options.get(pick))
                .is_some_and(|option| option.correct)
        })
        .count();
    let percentage = if total == 0 {
        0
    } else {
        u32::try_from((correct * 100 + total / 2) / total).unwrap_or(100)
    };
    Score { correct, total, percentage }
}

/// A generated quiz being taken.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Quiz {
    questions: Vec<McqQuestion>,
    answers: Vec<Option<usize>>,
    submitted: bool,
}

impl Quiz {
    #[must_use]
    pub fn new(questions: Vec<McqQuestion>) -> Self {
        let answers = vec![None; questions.len()];
        Self { questions, answers, submitted: false }
    }

    #[must_use]
    pub fn questions(&self) -> &[McqQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn answer(&self, question: usize) -> Option<usize> {
        self.answers.get(question).copied().flatten()
    }

    /// Pick an option. Ignored after submission or for out-of-range indices.
    pub fn select(&mut self, question: usize, option: usize) {
        if self.submitted {
            return;
        }
        let in_range = self.questions.get(question).is_some_and(|q| option < q.options.len());
        if let (true, Some(slot)) = (in_range, self.answers.get_mut(question)) {
            *slot = Some(option);
        }
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Lock the answers and score them.
    pub fn submit(&mut self) -> Score {
        self.submitted = true;
        score(&self.questions, &self.answers)
    }

    /// Score so far, without locking.
    #[must_use]
    pub fn score(&self) -> Score {
        score(&self.questions, &self.answers)
    }
}
