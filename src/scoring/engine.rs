// src/scoring/engine.rs

use std::sync::Arc;

use super::{
    AnswerKeyResolver, AttemptSequencer, QuizError, ReviewAssembler, ScoringPolicy,
    SubmissionPersister, canonicalize, score,
};
use crate::cache::{CacheAside, CacheTier};
use crate::config::ATTEMPT_INSERT_RETRIES;
use crate::models::{
    review::QuizReview,
    submission::{
        GradedSubmission, NewSubmission, Paginated, QuizSummary, SubmissionFilter,
        SubmissionListItem, SubmittedAnswer,
    },
};
use crate::store::{QuizStore, StoreError};

/// Entry point for grading and reviewing quizzes. Cheap to clone; every
/// dependency is injected at construction.
#[derive(Clone)]
pub struct QuizEngine {
    store: Arc<dyn QuizStore>,
    cache: CacheAside,
    policy: ScoringPolicy,
    answer_keys: AnswerKeyResolver,
    attempts: AttemptSequencer,
    persister: SubmissionPersister,
    reviews: ReviewAssembler,
}

impl QuizEngine {
    pub fn new(store: Arc<dyn QuizStore>, cache: CacheAside, policy: ScoringPolicy) -> Self {
        let answer_keys = AnswerKeyResolver::new(store.clone(), cache.clone());
        Self {
            attempts: AttemptSequencer::new(store.clone()),
            persister: SubmissionPersister::new(store.clone()),
            reviews: ReviewAssembler::new(store.clone(), cache.clone(), answer_keys.clone()),
            answer_keys,
            store,
            cache,
            policy,
        }
    }

    /// Grades one attempt and records it.
    ///
    /// Steps run strictly in order: answer key, canonical string, attempt
    /// number, score, insert. Any failure aborts before the insert.
    pub async fn submit_quiz(
        &self,
        set_id: i64,
        user_id: i64,
        answers: Vec<SubmittedAnswer>,
    ) -> Result<GradedSubmission, QuizError> {
        let key = self.answer_keys.resolve(set_id).await?;
        if key.total_questions == 0 {
            return Err(QuizError::EmptyQuestionSet(set_id));
        }

        let submitted = canonicalize(answers, key.total_questions)?;

        let guard = self.attempts.lock(user_id, set_id).await;
        let mut conflicts = 0;
        loop {
            let attempt_no = self.attempts.next_attempt(&guard, user_id, set_id).await?;
            let graded = score(set_id, &submitted, &key.canonical, key.total_questions, self.policy)?;

            let row = NewSubmission {
                user_id,
                set_id,
                answer: submitted.clone(),
                correct: graded.correct_count,
                grade: graded.grade,
                attempt_no,
            };

            match self.persister.record(&row).await {
                Ok(id) => {
                    return Ok(GradedSubmission {
                        id,
                        attempt_no,
                        correct_count: graded.correct_count,
                        grade: graded.grade,
                        total_questions: key.total_questions,
                    });
                }
                Err(StoreError::Conflict(reason)) if conflicts < ATTEMPT_INSERT_RETRIES => {
                    conflicts += 1;
                    tracing::warn!(
                        user_id,
                        set_id,
                        attempt_no,
                        conflicts,
                        "Attempt number taken by a concurrent submission, retrying: {}",
                        reason
                    );
                }
                Err(e) => {
                    tracing::error!(user_id, set_id, "Failed to record quiz submission: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    pub async fn last_review(&self, user_id: i64) -> Result<QuizReview, QuizError> {
        self.reviews.last_for_user(user_id).await
    }

    pub async fn review_by_submission(&self, submission_id: i64) -> Result<QuizReview, QuizError> {
        self.reviews.by_submission(submission_id).await
    }

    /// The caller's submission history, newest first.
    pub async fn list_submissions(
        &self,
        user_id: i64,
        filter: &SubmissionFilter,
    ) -> Result<Paginated<SubmissionListItem>, QuizError> {
        let key = filter.append_to(self.cache.key("quiz:submissions").param("user_id", user_id));
        self.cache
            .get_or_load(&key, CacheTier::Instant, || self.load_page(Some(user_id), filter))
            .await
    }

    /// Every user's submissions, newest first.
    pub async fn list_all_submissions(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Paginated<SubmissionListItem>, QuizError> {
        let key = filter.append_to(self.cache.key("quiz:submissions:all"));
        self.cache
            .get_or_load(&key, CacheTier::Instant, || self.load_page(None, filter))
            .await
    }

    async fn load_page(
        &self,
        user_id: Option<i64>,
        filter: &SubmissionFilter,
    ) -> Result<Paginated<SubmissionListItem>, QuizError> {
        let (total, data) = self.store.list_submissions(user_id, filter).await?;
        Ok(Paginated {
            total,
            page: filter.page(),
            limit: filter.limit(),
            data,
        })
    }

    pub async fn summary(&self, user_id: i64) -> Result<QuizSummary, QuizError> {
        let (quiz_count, average_grade) = self.store.submission_stats(user_id).await?;
        Ok(QuizSummary {
            quiz_count,
            average_grade,
        })
    }

    /// Drops every cached view of a set's questions after an authoring edit.
    pub async fn refresh_answer_key(&self, set_id: i64) {
        self.answer_keys.refresh(set_id).await;
        self.reviews.forget_set_content(set_id).await;
    }
}
