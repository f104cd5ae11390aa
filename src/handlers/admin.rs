// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{error::AppError, models::submission::SubmissionFilter, scoring::QuizEngine};

/// Lists every user's quiz submissions.
/// Admin only.
pub async fn list_submissions(
    State(engine): State<QuizEngine>,
    Query(filter): Query<SubmissionFilter>,
) -> Result<impl IntoResponse, AppError> {
    let page = engine.list_all_submissions(&filter).await?;
    Ok(Json(page))
}

/// Drops the cached answer key of a set after its questions were edited.
/// Admin only.
pub async fn refresh_answer_key(
    State(engine): State<QuizEngine>,
    Path(set_id): Path<i64>,
) -> impl IntoResponse {
    engine.refresh_answer_key(set_id).await;
    StatusCode::NO_CONTENT
}
