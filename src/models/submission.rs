// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::cache::CacheKey;
use crate::config::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Represents the 'quiz_submissions' table.
/// One row per graded attempt; never updated after insert.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub set_id: i64,
    /// Submitted codes concatenated in ascending question-number order.
    pub answer: String,
    pub correct: i32,
    pub grade: i32,
    pub attempt_no: i32,
    pub submitted_at: DateTime<Utc>,
}

/// Values written by the persister.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub user_id: i64,
    pub set_id: i64,
    pub answer: String,
    pub correct: i32,
    pub grade: i32,
    pub attempt_no: i32,
}

/// One (question number, chosen code) pair of a submission.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmittedAnswer {
    #[validate(range(min = 1, message = "Question number must be positive."))]
    pub number: i32,
    #[validate(length(equal = 1, message = "Answer must be a single option code."))]
    pub answer: String,
}

impl SubmittedAnswer {
    pub fn new(number: i32, answer: impl Into<String>) -> Self {
        Self {
            number,
            answer: answer.into(),
        }
    }
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SubmitQuizRequest {
    /// May be empty; the engine checks the count against the set.
    #[validate(nested)]
    pub answers: Vec<SubmittedAnswer>,
}

/// Outcome of a successful grading call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GradedSubmission {
    pub id: i64,
    pub attempt_no: i32,
    pub correct_count: i32,
    pub grade: i32,
    pub total_questions: i64,
}

/// Row of the submission history listing.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct SubmissionListItem {
    pub id: i64,
    pub set_id: i64,
    pub user_id: i64,
    pub username: String,
    pub correct: i32,
    pub grade: i32,
    pub attempt_no: i32,
    pub lesson: Option<String>,
    pub class: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Recognized listing filters. Parsed from the query string.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SubmissionFilter {
    pub lesson_id: Option<i64>,
    pub class_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SubmissionFilter {
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }

    /// Appends every filter field in a fixed order. Page and limit are always
    /// written with their effective values so defaults share one entry.
    pub fn append_to(&self, key: CacheKey) -> CacheKey {
        key.opt_param("lesson_id", self.lesson_id)
            .opt_param("class_id", self.class_id)
            .opt_param("type", self.kind.as_deref())
            .param("page", self.page())
            .param("limit", self.limit())
    }
}

/// Generic paginated response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub data: Vec<T>,
}

/// Aggregate over a user's submissions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizSummary {
    pub quiz_count: i64,
    pub average_grade: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults() {
        let filter = SubmissionFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), DEFAULT_PAGE_LIMIT);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn filter_clamps_limit_and_ignores_zero_page() {
        let filter = SubmissionFilter {
            page: Some(0),
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), MAX_PAGE_LIMIT);
    }

    #[test]
    fn filter_offset() {
        let filter = SubmissionFilter {
            page: Some(3),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn defaulted_and_explicit_filters_share_a_key() {
        let implicit = SubmissionFilter::default();
        let explicit = SubmissionFilter {
            page: Some(1),
            limit: Some(DEFAULT_PAGE_LIMIT),
            ..Default::default()
        };
        let base = || CacheKey::new("cache", "quiz:submissions");
        assert_eq!(implicit.append_to(base()), explicit.append_to(base()));
    }

    #[test]
    fn different_filters_never_share_a_key() {
        let base = || CacheKey::new("cache", "quiz:submissions");
        let by_lesson = SubmissionFilter {
            lesson_id: Some(2),
            ..Default::default()
        };
        let by_class = SubmissionFilter {
            class_id: Some(2),
            ..Default::default()
        };
        let by_page = SubmissionFilter {
            page: Some(2),
            ..Default::default()
        };
        let keys = [
            by_lesson.append_to(base()),
            by_class.append_to(base()),
            by_page.append_to(base()),
        ];
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[0], keys[2]);
        assert_ne!(keys[1], keys[2]);
    }

    #[test]
    fn request_validation_rejects_multi_char_codes() {
        let req = SubmitQuizRequest {
            answers: vec![SubmittedAnswer::new(1, "ab")],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_validation_leaves_empty_answers_to_the_engine() {
        let req = SubmitQuizRequest { answers: vec![] };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn request_validation_accepts_single_codes() {
        let req = SubmitQuizRequest {
            answers: vec![SubmittedAnswer::new(1, "a"), SubmittedAnswer::new(2, "d")],
        };
        assert!(req.validate().is_ok());
    }
}
