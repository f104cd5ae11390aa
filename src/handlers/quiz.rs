// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::submission::{SubmissionFilter, SubmitQuizRequest},
    scoring::QuizEngine,
    utils::jwt::Claims,
};

/// Grades and records one quiz attempt.
///
/// * Validates the payload shape.
/// * Delegates grading to the engine (answer key, attempt number, score).
/// * Returns the new submission id with its grade.
pub async fn submit_quiz(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
    Path(set_id): Path<i64>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let user_id = claims.user_id()?;

    let graded = engine.submit_quiz(set_id, user_id, req.answers).await?;

    Ok(Json(graded))
}

/// Review of the caller's most recent submission.
pub async fn get_result(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let review = engine.last_review(claims.user_id()?).await?;
    Ok(Json(review))
}

/// Review of one submission. Only the owner or an admin may read it.
pub async fn get_submission(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
    Path(submission_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let review = engine.review_by_submission(submission_id).await?;

    if review.user_id != claims.user_id()? && !claims.is_admin() {
        return Err(AppError::NotFound("Submission not found".to_string()));
    }

    Ok(Json(review))
}

/// Caller's submission history.
pub async fn list_submissions(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<SubmissionFilter>,
) -> Result<impl IntoResponse, AppError> {
    let page = engine.list_submissions(claims.user_id()?, &filter).await?;
    Ok(Json(page))
}

pub async fn get_summary(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let summary = engine.summary(claims.user_id()?).await?;
    Ok(Json(summary))
}
