// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Detailed result of one past submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizReview {
    pub id: i64,
    pub user_id: i64,
    pub set_id: i64,
    pub grade: i32,
    pub correct: i32,
    pub wrong: i64,
    pub attempt_no: i32,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<QuestionReview>,
}

/// Per-question comparison of the user's choice against the key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionReview {
    pub number: i32,
    pub user_code: String,
    pub actual_code: String,
    pub user_content: String,
    pub actual_content: String,
    pub question_content: String,
    pub format: String,
    pub explanation: String,
    pub is_correct: bool,
}
