// src/scoring/grade.rs

use std::fmt;
use std::str::FromStr;

use super::QuizError;

/// How an answer key shorter than the question count is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringPolicy {
    /// Compare up to the shorter string; missing key positions never match.
    #[default]
    Lenient,
    /// Refuse to grade against an incomplete key.
    Strict,
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ScoringPolicy::Lenient),
            "strict" => Ok(ScoringPolicy::Strict),
            other => Err(format!("unknown scoring policy '{}'", other)),
        }
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringPolicy::Lenient => f.write_str("lenient"),
            ScoringPolicy::Strict => f.write_str("strict"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct_count: i32,
    /// Integer percentage, floored, in 0..=100.
    pub grade: i32,
}

/// Grades `submitted` against `canonical` position by position.
///
/// Characters are compared exactly (case-sensitive). `grade` is
/// `floor(correct * 100 / total)`.
pub fn score(
    set_id: i64,
    submitted: &str,
    canonical: &str,
    total_questions: i64,
    policy: ScoringPolicy,
) -> Result<Score, QuizError> {
    if total_questions <= 0 {
        return Err(QuizError::EmptyQuestionSet(set_id));
    }

    if policy == ScoringPolicy::Strict {
        let key_len = canonical.chars().count();
        if key_len as i64 != total_questions {
            return Err(QuizError::IncompleteAnswerKey {
                set_id,
                key_len,
                total: total_questions,
            });
        }
    }

    let correct = submitted
        .chars()
        .zip(canonical.chars())
        .filter(|(given, expected)| given == expected)
        .count() as i64;
    // A key with duplicate correct flags may be longer than the set.
    let correct = correct.min(total_questions);

    Ok(Score {
        correct_count: correct as i32,
        grade: (correct * 100 / total_questions) as i32,
    })
}
