// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'sets' table: one quiz (question set).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct QuestionSet {
    pub id: i64,
    pub name: String,
    pub lesson_id: Option<i64>,
    pub class_id: Option<i64>,

    /// Set type, e.g. 'quiz' or 'exercise'.
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
}

/// Represents the 'questions' table.
/// `number` is unique within a set and fixes the answer-string position.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: i64,
    pub set_id: i64,
    pub number: i32,
    pub content: String,
    /// Display format, e.g. 'text' or 'image'.
    pub format: String,
    pub explanation: Option<String>,
}

/// Represents the 'answers' table: one selectable option of a question.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    /// Single-character option code ("a".."d").
    pub code: String,
    pub content: String,
    pub is_correct: bool,
}

/// Correct option of one question, as read for answer-key aggregation.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct CorrectAnswer {
    pub number: i32,
    pub code: String,
}

/// Questions and options of one set, ordered by question number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetContent {
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
}
