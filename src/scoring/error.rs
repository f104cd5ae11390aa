// src/scoring/error.rs

use thiserror::Error;

use crate::store::StoreError;

/// Failures of a grading or review call. Every validation error is raised
/// before anything is written.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("invalid number of answers provided: expected {expected}, got {got}")]
    InvalidSubmission { expected: i64, got: usize },

    #[error("answer for question {number} must be a single option code")]
    InvalidAnswerCode { number: i32 },

    #[error("no questions found in set {0}")]
    EmptyQuestionSet(i64),

    /// Only raised under the strict scoring policy.
    #[error("answer key of set {set_id} covers {key_len} of {total} questions")]
    IncompleteAnswerKey {
        set_id: i64,
        key_len: usize,
        total: i64,
    },

    #[error("question set {0} not found")]
    SetNotFound(i64),

    #[error("quiz submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        QuizError::StoreUnavailable(err.to_string())
    }
}
