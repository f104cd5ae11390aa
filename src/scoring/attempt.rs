// src/scoring/attempt.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::QuizError;
use crate::store::QuizStore;

type PairKey = (i64, i64);

/// Serializes attempt assignment per (user, set) within this process.
/// Cross-process races are caught by the unique index on
/// `(user_id, set_id, attempt_no)`.
#[derive(Default)]
struct AttemptLocks {
    slots: Mutex<HashMap<PairKey, Arc<AsyncMutex<()>>>>,
}

impl AttemptLocks {
    async fn acquire(&self, key: PairKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            // Drop slots nobody is holding or waiting on.
            slots.retain(|k, slot| *k == key || Arc::strong_count(slot) > 1);
            slots.entry(key).or_default().clone()
        };
        slot.lock_owned().await
    }

    fn tracked(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Held while the next attempt number is read and its row inserted.
pub struct AttemptGuard {
    _guard: OwnedMutexGuard<()>,
}

#[derive(Clone)]
pub struct AttemptSequencer {
    store: Arc<dyn QuizStore>,
    locks: Arc<AttemptLocks>,
}

impl AttemptSequencer {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self {
            store,
            locks: Arc::new(AttemptLocks::default()),
        }
    }

    /// Waits for exclusive access to the (user, set) sequence.
    pub async fn lock(&self, user_id: i64, set_id: i64) -> AttemptGuard {
        AttemptGuard {
            _guard: self.locks.acquire((user_id, set_id)).await,
        }
    }

    /// `1 + max(attempt_no)` over the pair's existing submissions.
    pub async fn next_attempt(
        &self,
        _guard: &AttemptGuard,
        user_id: i64,
        set_id: i64,
    ) -> Result<i32, QuizError> {
        let current = self.store.max_attempt_no(user_id, set_id).await?;
        Ok(current + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::NewSubmission;
    use crate::store::MemoryQuizStore;

    #[tokio::test]
    async fn first_attempt_is_one_then_increments() {
        let store = Arc::new(MemoryQuizStore::new());
        let sequencer = AttemptSequencer::new(store.clone());

        let guard = sequencer.lock(7, 1).await;
        assert_eq!(sequencer.next_attempt(&guard, 7, 1).await.unwrap(), 1);

        store
            .insert_submission(&NewSubmission {
                user_id: 7,
                set_id: 1,
                answer: "a".to_string(),
                correct: 1,
                grade: 100,
                attempt_no: 1,
            })
            .await
            .unwrap();

        assert_eq!(sequencer.next_attempt(&guard, 7, 1).await.unwrap(), 2);
        // Other pairs have their own sequence.
        assert_eq!(sequencer.next_attempt(&guard, 7, 2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lock_excludes_second_holder() {
        let sequencer = AttemptSequencer::new(Arc::new(MemoryQuizStore::new()));
        let held = sequencer.lock(1, 1).await;

        let contender = sequencer.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.lock(1, 1).await;
        });

        tokio::task::yield_now().await;
        assert!(!waiting.is_finished());

        drop(held);
        waiting.await.unwrap();
    }

    #[tokio::test]
    async fn distinct_pairs_do_not_block() {
        let sequencer = AttemptSequencer::new(Arc::new(MemoryQuizStore::new()));
        let _first = sequencer.lock(1, 1).await;
        let _second = sequencer.lock(1, 2).await;
        let _third = sequencer.lock(2, 1).await;
    }

    #[tokio::test]
    async fn released_slots_are_pruned() {
        let sequencer = AttemptSequencer::new(Arc::new(MemoryQuizStore::new()));
        for set_id in 0..10 {
            let _guard = sequencer.lock(1, set_id).await;
        }
        let _guard = sequencer.lock(2, 2).await;
        assert_eq!(sequencer.locks.tracked(), 1);
    }
}
