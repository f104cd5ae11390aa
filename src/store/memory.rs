// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{QuizStore, StoreError, StoreResult};
use crate::models::{
    question::{Answer, CorrectAnswer, Question, QuestionSet},
    submission::{NewSubmission, Submission, SubmissionFilter, SubmissionListItem},
};

const OPTION_CODES: [char; 4] = ['a', 'b', 'c', 'd'];

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<i64, String>,
    lessons: HashMap<i64, String>,
    classes: HashMap<i64, String>,
    sets: BTreeMap<i64, QuestionSet>,
    questions: BTreeMap<i64, Question>,
    answers: BTreeMap<i64, Answer>,
    submissions: BTreeMap<i64, Submission>,
    next_question_id: i64,
    next_answer_id: i64,
    next_submission_id: i64,
}

/// Store kept entirely in memory, with the same uniqueness rules as the
/// Postgres schema. Backs the integration tests and local runs without a
/// database.
#[derive(Debug, Default)]
pub struct MemoryQuizStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    conflicting: AtomicBool,
    insert_calls: AtomicUsize,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.check_available()?;
        Ok(self.tables.read().unwrap_or_else(|e| e.into_inner()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.check_available()?;
        Ok(self.tables.write().unwrap_or_else(|e| e.into_inner()))
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    /// Makes every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes every submission insert fail with a uniqueness conflict.
    pub fn set_conflicting(&self, conflicting: bool) {
        self.conflicting.store(conflicting, Ordering::SeqCst);
    }

    /// Number of submission inserts attempted, successful or not.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    fn tables_mut(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_user(&self, id: i64, username: impl Into<String>) {
        self.tables_mut().users.insert(id, username.into());
    }

    pub fn add_lesson(&self, id: i64, name: impl Into<String>) {
        self.tables_mut().lessons.insert(id, name.into());
    }

    pub fn add_class(&self, id: i64, name: impl Into<String>) {
        self.tables_mut().classes.insert(id, name.into());
    }

    pub fn add_set(&self, set: QuestionSet) {
        self.tables_mut().sets.insert(set.id, set);
    }

    /// Inserts a question, assigning its id.
    pub fn add_question(&self, set_id: i64, number: i32, content: &str, explanation: &str) -> i64 {
        let mut tables = self.tables_mut();
        tables.next_question_id += 1;
        let id = tables.next_question_id;
        tables.questions.insert(
            id,
            Question {
                id,
                set_id,
                number,
                content: content.to_string(),
                format: "text".to_string(),
                explanation: Some(explanation.to_string()),
            },
        );
        id
    }

    /// Rewrites the prompt of an existing question, as an authoring edit would.
    pub fn edit_question(&self, question_id: i64, content: &str) {
        if let Some(question) = self.tables_mut().questions.get_mut(&question_id) {
            question.content = content.to_string();
        }
    }

    /// Inserts an option for a question, assigning its id.
    pub fn add_answer(&self, question_id: i64, code: &str, content: &str, is_correct: bool) -> i64 {
        let mut tables = self.tables_mut();
        tables.next_answer_id += 1;
        let id = tables.next_answer_id;
        tables.answers.insert(
            id,
            Answer {
                id,
                question_id,
                code: code.to_string(),
                content: content.to_string(),
                is_correct,
            },
        );
        id
    }

    /// Creates a set whose question `n` (1-based) has options a..d and the
    /// n-th character of `key` as its correct option. A `_` leaves the
    /// question without a correct option.
    pub fn seed_quiz(&self, set: QuestionSet, key: &str) {
        let set_id = set.id;
        self.add_set(set);
        for (index, correct) in key.chars().enumerate() {
            let number = index as i32 + 1;
            let question_id = self.add_question(
                set_id,
                number,
                &format!("Question {}", number),
                &format!("Explanation {}", number),
            );
            for code in OPTION_CODES {
                self.add_answer(
                    question_id,
                    &code.to_string(),
                    &format!("Option {} of question {}", code, number),
                    code == correct,
                );
            }
        }
    }

    pub fn submission_count(&self) -> usize {
        self.tables.read().unwrap_or_else(|e| e.into_inner()).submissions.len()
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn find_set(&self, set_id: i64) -> StoreResult<Option<QuestionSet>> {
        Ok(self.read()?.sets.get(&set_id).cloned())
    }

    async fn count_questions(&self, set_id: i64) -> StoreResult<i64> {
        let tables = self.read()?;
        Ok(tables.questions.values().filter(|q| q.set_id == set_id).count() as i64)
    }

    async fn correct_answers(&self, set_id: i64) -> StoreResult<Vec<CorrectAnswer>> {
        let tables = self.read()?;
        let mut rows: Vec<CorrectAnswer> = tables
            .answers
            .values()
            .filter(|a| a.is_correct)
            .filter_map(|a| {
                let question = tables.questions.get(&a.question_id)?;
                (question.set_id == set_id).then(|| CorrectAnswer {
                    number: question.number,
                    code: a.code.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|row| row.number);
        Ok(rows)
    }

    async fn questions_for_set(&self, set_id: i64) -> StoreResult<Vec<Question>> {
        let tables = self.read()?;
        let mut rows: Vec<Question> = tables
            .questions
            .values()
            .filter(|q| q.set_id == set_id)
            .cloned()
            .collect();
        rows.sort_by_key(|q| q.number);
        Ok(rows)
    }

    async fn answers_for_questions(&self, question_ids: &[i64]) -> StoreResult<Vec<Answer>> {
        let tables = self.read()?;
        Ok(tables
            .answers
            .values()
            .filter(|a| question_ids.contains(&a.question_id))
            .cloned()
            .collect())
    }

    async fn max_attempt_no(&self, user_id: i64, set_id: i64) -> StoreResult<i32> {
        let tables = self.read()?;
        Ok(tables
            .submissions
            .values()
            .filter(|s| s.user_id == user_id && s.set_id == set_id)
            .map(|s| s.attempt_no)
            .max()
            .unwrap_or(0))
    }

    async fn insert_submission(&self, submission: &NewSubmission) -> StoreResult<i64> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.write()?;
        let duplicate = self.conflicting.load(Ordering::SeqCst)
            || tables.submissions.values().any(|s| {
                s.user_id == submission.user_id
                    && s.set_id == submission.set_id
                    && s.attempt_no == submission.attempt_no
            });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "attempt {} already recorded for user {} on set {}",
                submission.attempt_no, submission.user_id, submission.set_id
            )));
        }

        tables.next_submission_id += 1;
        let id = tables.next_submission_id;
        tables.submissions.insert(
            id,
            Submission {
                id,
                user_id: submission.user_id,
                set_id: submission.set_id,
                answer: submission.answer.clone(),
                correct: submission.correct,
                grade: submission.grade,
                attempt_no: submission.attempt_no,
                submitted_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn latest_submission(&self, user_id: i64) -> StoreResult<Option<Submission>> {
        let tables = self.read()?;
        Ok(tables
            .submissions
            .values()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| (s.submitted_at, s.id))
            .cloned())
    }

    async fn submission_by_id(&self, submission_id: i64) -> StoreResult<Option<Submission>> {
        Ok(self.read()?.submissions.get(&submission_id).cloned())
    }

    async fn list_submissions(
        &self,
        user_id: Option<i64>,
        filter: &SubmissionFilter,
    ) -> StoreResult<(i64, Vec<SubmissionListItem>)> {
        let tables = self.read()?;
        let mut matching: Vec<SubmissionListItem> = tables
            .submissions
            .values()
            .filter(|s| user_id.is_none_or(|uid| s.user_id == uid))
            .filter_map(|s| {
                let set = tables.sets.get(&s.set_id)?;
                let username = tables.users.get(&s.user_id)?;
                let keep = filter.lesson_id.is_none_or(|id| set.lesson_id == Some(id))
                    && filter.class_id.is_none_or(|id| set.class_id == Some(id))
                    && filter.kind.as_ref().is_none_or(|kind| &set.kind == kind);
                keep.then(|| SubmissionListItem {
                    id: s.id,
                    set_id: s.set_id,
                    user_id: s.user_id,
                    username: username.clone(),
                    correct: s.correct,
                    grade: s.grade,
                    attempt_no: s.attempt_no,
                    lesson: set.lesson_id.and_then(|id| tables.lessons.get(&id).cloned()),
                    class: set.class_id.and_then(|id| tables.classes.get(&id).cloned()),
                    submitted_at: s.submitted_at,
                })
            })
            .collect();

        matching.sort_by(|a, b| (b.submitted_at, b.id).cmp(&(a.submitted_at, a.id)));
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect();

        Ok((total, page))
    }

    async fn submission_stats(&self, user_id: i64) -> StoreResult<(i64, f64)> {
        let tables = self.read()?;
        let grades: Vec<i32> = tables
            .submissions
            .values()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.grade)
            .collect();

        if grades.is_empty() {
            return Ok((0, 0.0));
        }
        let sum: i64 = grades.iter().map(|g| i64::from(*g)).sum();
        Ok((grades.len() as i64, sum as f64 / grades.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(id: i64) -> QuestionSet {
        QuestionSet {
            id,
            name: format!("Set {}", id),
            lesson_id: Some(1),
            class_id: Some(1),
            kind: "quiz".to_string(),
        }
    }

    fn submission(attempt_no: i32) -> NewSubmission {
        NewSubmission {
            user_id: 1,
            set_id: 1,
            answer: "ab".to_string(),
            correct: 1,
            grade: 50,
            attempt_no,
        }
    }

    #[tokio::test]
    async fn seeded_quiz_exposes_ordered_key() {
        let store = MemoryQuizStore::new();
        store.seed_quiz(set(1), "dacb");

        assert_eq!(store.count_questions(1).await.unwrap(), 4);
        let codes: String = store
            .correct_answers(1)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.code)
            .collect();
        assert_eq!(codes, "dacb");
    }

    #[tokio::test]
    async fn duplicate_attempt_is_a_conflict() {
        let store = MemoryQuizStore::new();
        store.insert_submission(&submission(1)).await.unwrap();

        let err = store.insert_submission(&submission(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.submission_count(), 1);
        assert_eq!(store.max_attempt_no(1, 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryQuizStore::new();
        store.set_unavailable(true);
        let err = store.count_questions(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn stats_average_grades() {
        let store = MemoryQuizStore::new();
        assert_eq!(store.submission_stats(1).await.unwrap(), (0, 0.0));

        store.insert_submission(&submission(1)).await.unwrap();
        let mut second = submission(2);
        second.grade = 100;
        store.insert_submission(&second).await.unwrap();

        assert_eq!(store.submission_stats(1).await.unwrap(), (2, 75.0));
    }
}
