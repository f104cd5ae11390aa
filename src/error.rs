// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::scoring::QuizError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity (quiz data cannot be graded)
    UnprocessableEntity(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Maps quiz engine failures onto HTTP semantics.
impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        let message = err.to_string();
        match err {
            QuizError::InvalidSubmission { .. } | QuizError::InvalidAnswerCode { .. } => {
                AppError::BadRequest(message)
            }
            QuizError::EmptyQuestionSet(_) | QuizError::IncompleteAnswerKey { .. } => {
                AppError::UnprocessableEntity(message)
            }
            QuizError::SetNotFound(_) | QuizError::SubmissionNotFound(_) => {
                AppError::NotFound(message)
            }
            QuizError::StoreUnavailable(_) => AppError::InternalServerError(message),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_submission_is_bad_request() {
        let err: AppError = QuizError::InvalidSubmission { expected: 5, got: 3 }.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_set_is_unprocessable() {
        let err: AppError = QuizError::EmptyQuestionSet(7).into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn missing_entities_are_not_found() {
        let set: AppError = QuizError::SetNotFound(1).into();
        let submission: AppError = QuizError::SubmissionNotFound("id 9".to_string()).into();
        assert_eq!(set.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(submission.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_failure_hides_details() {
        let err: AppError = QuizError::StoreUnavailable("connection reset".to_string()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
