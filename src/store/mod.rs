// src/store/mod.rs

//! Authoritative relational store consumed by the quiz engine.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    question::{Answer, CorrectAnswer, Question, QuestionSet},
    submission::{NewSubmission, Submission, SubmissionFilter, SubmissionListItem},
};

pub use memory::MemoryQuizStore;
pub use postgres::PgQuizStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Conflict(db.message().to_string());
            }
        }
        StoreError::Unavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Queries the quiz engine issues against the relational store.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_set(&self, set_id: i64) -> StoreResult<Option<QuestionSet>>;

    async fn count_questions(&self, set_id: i64) -> StoreResult<i64>;

    /// Correct option per question, ascending by question number. Questions
    /// without a flagged option are absent.
    async fn correct_answers(&self, set_id: i64) -> StoreResult<Vec<CorrectAnswer>>;

    /// Questions of a set, ascending by number.
    async fn questions_for_set(&self, set_id: i64) -> StoreResult<Vec<Question>>;

    async fn answers_for_questions(&self, question_ids: &[i64]) -> StoreResult<Vec<Answer>>;

    /// Highest recorded attempt for the pair, 0 when there is none.
    async fn max_attempt_no(&self, user_id: i64, set_id: i64) -> StoreResult<i32>;

    /// Inserts one submission and returns its id. Fails with
    /// [`StoreError::Conflict`] when `(user_id, set_id, attempt_no)` exists.
    async fn insert_submission(&self, submission: &NewSubmission) -> StoreResult<i64>;

    async fn latest_submission(&self, user_id: i64) -> StoreResult<Option<Submission>>;

    async fn submission_by_id(&self, submission_id: i64) -> StoreResult<Option<Submission>>;

    /// Newest-first page of submissions plus the unpaginated total.
    /// `user_id = None` lists every user's submissions.
    async fn list_submissions(
        &self,
        user_id: Option<i64>,
        filter: &SubmissionFilter,
    ) -> StoreResult<(i64, Vec<SubmissionListItem>)>;

    /// Number of submissions and their average grade.
    async fn submission_stats(&self, user_id: i64) -> StoreResult<(i64, f64)>;
}
