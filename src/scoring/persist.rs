// src/scoring/persist.rs

use std::sync::Arc;

use crate::models::submission::NewSubmission;
use crate::store::{QuizStore, StoreResult};

/// Writes graded submissions. Rows are immutable once written.
#[derive(Clone)]
pub struct SubmissionPersister {
    store: Arc<dyn QuizStore>,
}

impl SubmissionPersister {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// Inserts one row and returns its id. Conflicts are passed back so the
    /// caller can pick a new attempt number.
    pub async fn record(&self, submission: &NewSubmission) -> StoreResult<i64> {
        let id = self.store.insert_submission(submission).await?;
        tracing::info!(
            submission_id = id,
            user_id = submission.user_id,
            set_id = submission.set_id,
            attempt_no = submission.attempt_no,
            grade = submission.grade,
            "Quiz submission recorded"
        );
        Ok(id)
    }
}
