// src/scoring/mod.rs

//! Quiz submission and scoring engine.

pub mod answer_key;
pub mod attempt;
pub mod canonical;
pub mod engine;
pub mod error;
pub mod grade;
pub mod persist;
pub mod review;

pub use answer_key::{AnswerKey, AnswerKeyResolver};
pub use attempt::{AttemptGuard, AttemptSequencer};
pub use canonical::canonicalize;
pub use engine::QuizEngine;
pub use error::QuizError;
pub use grade::{Score, ScoringPolicy, score};
pub use persist::SubmissionPersister;
pub use review::ReviewAssembler;
