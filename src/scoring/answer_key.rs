// src/scoring/answer_key.rs

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::QuizError;
use crate::cache::{CacheAside, CacheKey, CacheTier};
use crate::models::question::CorrectAnswer;
use crate::store::QuizStore;

/// Authoring edits must show up within this tier's TTL.
const ANSWER_KEY_TIER: CacheTier = CacheTier::Fast;

/// Question count and concatenated correct codes of one set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerKey {
    pub total_questions: i64,
    /// Correct codes in ascending question-number order. Questions without a
    /// flagged answer contribute nothing, so this may be shorter than
    /// `total_questions`.
    pub canonical: String,
}

/// Concatenates correct codes in ascending question-number order.
pub fn build_canonical(mut rows: Vec<CorrectAnswer>) -> String {
    rows.sort_by_key(|row| row.number);
    rows.into_iter().map(|row| row.code).collect()
}

#[derive(Clone)]
pub struct AnswerKeyResolver {
    store: Arc<dyn QuizStore>,
    cache: CacheAside,
}

impl AnswerKeyResolver {
    pub fn new(store: Arc<dyn QuizStore>, cache: CacheAside) -> Self {
        Self { store, cache }
    }

    fn cache_key(&self, set_id: i64) -> CacheKey {
        self.cache.key("quiz:answer_key").param("set_id", set_id)
    }

    pub async fn resolve(&self, set_id: i64) -> Result<AnswerKey, QuizError> {
        let key = self.cache_key(set_id);
        self.cache
            .get_or_load(&key, ANSWER_KEY_TIER, || self.load(set_id))
            .await
    }

    /// Drops the cached key so the next grading call reads the store.
    pub async fn refresh(&self, set_id: i64) {
        tracing::info!(set_id, "Invalidating cached answer key");
        self.cache.invalidate(&self.cache_key(set_id)).await;
    }

    async fn load(&self, set_id: i64) -> Result<AnswerKey, QuizError> {
        if self.store.find_set(set_id).await?.is_none() {
            return Err(QuizError::SetNotFound(set_id));
        }

        let total_questions = self.store.count_questions(set_id).await?;
        let canonical = build_canonical(self.store.correct_answers(set_id).await?);

        let key_len = canonical.chars().count() as i64;
        if key_len != total_questions {
            tracing::warn!(
                set_id,
                total_questions,
                key_len,
                "Answer key does not cover every question"
            );
        }

        Ok(AnswerKey {
            total_questions,
            canonical,
        })
    }
}
