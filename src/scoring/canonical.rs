// src/scoring/canonical.rs

use super::QuizError;
use crate::models::submission::SubmittedAnswer;

/// Turns the caller's answers into the position-ordered answer string.
///
/// The answer count must equal the set's question count; partial submissions
/// are rejected, not partially graded. Question numbers are only used for
/// ordering and are not matched against the set.
pub fn canonicalize(
    mut answers: Vec<SubmittedAnswer>,
    total_questions: i64,
) -> Result<String, QuizError> {
    if answers.len() as i64 != total_questions {
        return Err(QuizError::InvalidSubmission {
            expected: total_questions,
            got: answers.len(),
        });
    }

    if let Some(bad) = answers.iter().find(|a| a.answer.chars().count() != 1) {
        return Err(QuizError::InvalidAnswerCode { number: bad.number });
    }

    answers.sort_by_key(|a| a.number);
    Ok(answers.into_iter().map(|a| a.answer).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(i32, &str)]) -> Vec<SubmittedAnswer> {
        pairs.iter().map(|(n, a)| SubmittedAnswer::new(*n, *a)).collect()
    }

    #[test]
    fn orders_by_question_number() {
        let submitted = answers(&[(3, "c"), (1, "a"), (5, "b"), (2, "b"), (4, "d")]);
        assert_eq!(canonicalize(submitted, 5).unwrap(), "abcdb");
    }

    #[test]
    fn rejects_partial_submission() {
        let err = canonicalize(answers(&[(1, "a"), (2, "b")]), 3).unwrap_err();
        assert!(matches!(err, QuizError::InvalidSubmission { expected: 3, got: 2 }));
    }

    #[test]
    fn rejects_extra_answers() {
        let err = canonicalize(answers(&[(1, "a"), (2, "b")]), 1).unwrap_err();
        assert!(matches!(err, QuizError::InvalidSubmission { expected: 1, got: 2 }));
    }

    #[test]
    fn rejects_multi_character_code() {
        let err = canonicalize(answers(&[(1, "a"), (2, "bc")]), 2).unwrap_err();
        assert!(matches!(err, QuizError::InvalidAnswerCode { number: 2 }));
    }

    #[test]
    fn numbers_need_not_be_contiguous() {
        let submitted = answers(&[(10, "b"), (2, "a")]);
        assert_eq!(canonicalize(submitted, 2).unwrap(), "ab");
    }
}
