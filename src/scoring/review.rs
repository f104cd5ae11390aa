// src/scoring/review.rs

use std::collections::HashMap;
use std::sync::Arc;

use super::{AnswerKeyResolver, QuizError};
use crate::cache::{CacheAside, CacheKey, CacheTier};
use crate::models::{
    question::{Answer, SetContent},
    review::{QuestionReview, QuizReview},
    submission::Submission,
};
use crate::store::QuizStore;

/// Rebuilds the explained, per-question view of a past submission.
#[derive(Clone)]
pub struct ReviewAssembler {
    store: Arc<dyn QuizStore>,
    cache: CacheAside,
    answer_keys: AnswerKeyResolver,
}

impl ReviewAssembler {
    pub fn new(store: Arc<dyn QuizStore>, cache: CacheAside, answer_keys: AnswerKeyResolver) -> Self {
        Self {
            store,
            cache,
            answer_keys,
        }
    }

    /// Review of the user's most recent submission.
    pub async fn last_for_user(&self, user_id: i64) -> Result<QuizReview, QuizError> {
        let submission = self
            .store
            .latest_submission(user_id)
            .await?
            .ok_or_else(|| QuizError::SubmissionNotFound(format!("no submissions for user {}", user_id)))?;

        self.review(submission).await
    }

    /// Review of one submission. Submissions never change, so the row is
    /// cached at the longest tier.
    pub async fn by_submission(&self, submission_id: i64) -> Result<QuizReview, QuizError> {
        let key = self.cache.key("quiz:submission").param("id", submission_id);
        let store = &self.store;
        let submission = self
            .cache
            .get_or_load(&key, CacheTier::Long, || async move {
                store
                    .submission_by_id(submission_id)
                    .await?
                    .ok_or_else(|| QuizError::SubmissionNotFound(format!("id {}", submission_id)))
            })
            .await?;

        self.review(submission).await
    }

    async fn review(&self, submission: Submission) -> Result<QuizReview, QuizError> {
        let total_questions = self.answer_keys.resolve(submission.set_id).await?.total_questions;
        let content = self.set_content(submission.set_id).await?;
        Ok(assemble(&submission, total_questions, &content))
    }

    /// Drops the cached questions and options of a set.
    pub async fn forget_set_content(&self, set_id: i64) {
        self.cache.invalidate(&self.set_content_key(set_id)).await;
    }

    fn set_content_key(&self, set_id: i64) -> CacheKey {
        self.cache.key("quiz:set_content").param("set_id", set_id)
    }

    async fn set_content(&self, set_id: i64) -> Result<SetContent, QuizError> {
        let key = self.set_content_key(set_id);
        let store = &self.store;
        self.cache
            .get_or_load(&key, CacheTier::Blazing, || async move {
                let questions = store.questions_for_set(set_id).await?;
                let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
                let answers = store.answers_for_questions(&ids).await?;
                Ok::<_, QuizError>(SetContent { questions, answers })
            })
            .await
    }
}

/// Walks the stored answer string in lock-step with the questions ordered by
/// number. A submission shorter than the question list ends the walk early.
pub fn assemble(submission: &Submission, total_questions: i64, content: &SetContent) -> QuizReview {
    let mut by_question: HashMap<i64, Vec<&Answer>> = HashMap::new();
    for answer in &content.answers {
        by_question.entry(answer.question_id).or_default().push(answer);
    }

    let mut questions: Vec<_> = content.questions.iter().collect();
    questions.sort_by_key(|q| q.number);

    let answers = questions
        .into_iter()
        .zip(submission.answer.chars())
        .map(|(question, user_char)| {
            let options = by_question.get(&question.id).map(Vec::as_slice).unwrap_or(&[]);
            let user_code = user_char.to_string();
            let actual = options.iter().find(|a| a.is_correct);
            let actual_code = actual.map(|a| a.code.clone()).unwrap_or_default();
            let user_content = options
                .iter()
                .find(|a| a.code == user_code)
                .map(|a| a.content.clone())
                .unwrap_or_default();

            QuestionReview {
                number: question.number,
                is_correct: user_code == actual_code,
                user_code,
                actual_code,
                user_content,
                actual_content: actual.map(|a| a.content.clone()).unwrap_or_default(),
                question_content: question.content.clone(),
                format: question.format.clone(),
                explanation: question.explanation.clone().unwrap_or_default(),
            }
        })
        .collect();

    QuizReview {
        id: submission.id,
        user_id: submission.user_id,
        set_id: submission.set_id,
        grade: submission.grade,
        correct: submission.correct,
        wrong: total_questions - i64::from(submission.correct),
        attempt_no: submission.attempt_no,
        submitted_at: submission.submitted_at,
        answers,
    }
}
