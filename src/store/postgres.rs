// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{QuizStore, StoreResult};
use crate::models::{
    question::{Answer, CorrectAnswer, Question, QuestionSet},
    submission::{NewSubmission, Submission, SubmissionFilter, SubmissionListItem},
};

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the shared WHERE clause of the submission listing queries.
fn push_listing_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    user_id: Option<i64>,
    filter: &SubmissionFilter,
) {
    qb.push(" WHERE TRUE");
    if let Some(user_id) = user_id {
        qb.push(" AND s.user_id = ").push_bind(user_id);
    }
    if let Some(lesson_id) = filter.lesson_id {
        qb.push(" AND a.lesson_id = ").push_bind(lesson_id);
    }
    if let Some(class_id) = filter.class_id {
        qb.push(" AND a.class_id = ").push_bind(class_id);
    }
    if let Some(kind) = &filter.kind {
        qb.push(" AND a.type = ").push_bind(kind.clone());
    }
}

const LISTING_FROM: &str = r#"
    FROM quiz_submissions s
    JOIN sets a ON s.set_id = a.id
    JOIN users u ON s.user_id = u.id
    LEFT JOIN lessons l ON a.lesson_id = l.id
    LEFT JOIN classes c ON a.class_id = c.id
"#;

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn find_set(&self, set_id: i64) -> StoreResult<Option<QuestionSet>> {
        let set = sqlx::query_as::<_, QuestionSet>(
            "SELECT id, name, lesson_id, class_id, type FROM sets WHERE id = $1",
        )
        .bind(set_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch set {}: {:?}", set_id, e);
            e
        })?;

        Ok(set)
    }

    async fn count_questions(&self, set_id: i64) -> StoreResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE set_id = $1")
            .bind(set_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count questions of set {}: {:?}", set_id, e);
                e
            })?;

        Ok(total)
    }

    async fn correct_answers(&self, set_id: i64) -> StoreResult<Vec<CorrectAnswer>> {
        let rows = sqlx::query_as::<_, CorrectAnswer>(
            r#"
            SELECT q.number, a.code
            FROM questions q
            JOIN answers a ON q.id = a.question_id
            WHERE q.set_id = $1 AND a.is_correct = TRUE
            ORDER BY q.number ASC
            "#,
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch answer key of set {}: {:?}", set_id, e);
            e
        })?;

        Ok(rows)
    }

    async fn questions_for_set(&self, set_id: i64) -> StoreResult<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, set_id, number, content, format, explanation
            FROM questions
            WHERE set_id = $1
            ORDER BY number ASC
            "#,
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions of set {}: {:?}", set_id, e);
            e
        })?;

        Ok(rows)
    }

    async fn answers_for_questions(&self, question_ids: &[i64]) -> StoreResult<Vec<Answer>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, question_id, code, content, is_correct
            FROM answers
            WHERE question_id = ANY($1)
            ORDER BY question_id, code
            "#,
        )
        .bind(question_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch answers: {:?}", e);
            e
        })?;

        Ok(rows)
    }

    async fn max_attempt_no(&self, user_id: i64, set_id: i64) -> StoreResult<i32> {
        let max: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(attempt_no), 0) FROM quiz_submissions WHERE user_id = $1 AND set_id = $2",
        )
        .bind(user_id)
        .bind(set_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read attempt number: {:?}", e);
            e
        })?;

        Ok(max)
    }

    async fn insert_submission(&self, submission: &NewSubmission) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_submissions (answer, correct, grade, attempt_no, set_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&submission.answer)
        .bind(submission.correct)
        .bind(submission.grade)
        .bind(submission.attempt_no)
        .bind(submission.set_id)
        .bind(submission.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn latest_submission(&self, user_id: i64) -> StoreResult<Option<Submission>> {
        let row = sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, user_id, set_id, answer, correct, grade, attempt_no, submitted_at
            FROM quiz_submissions
            WHERE user_id = $1
            ORDER BY submitted_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get last quiz submission: {:?}", e);
            e
        })?;

        Ok(row)
    }

    async fn submission_by_id(&self, submission_id: i64) -> StoreResult<Option<Submission>> {
        let row = sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, user_id, set_id, answer, correct, grade, attempt_no, submitted_at
            FROM quiz_submissions
            WHERE id = $1
            "#,
        )
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get quiz submission {}: {:?}", submission_id, e);
            e
        })?;

        Ok(row)
    }

    async fn list_submissions(
        &self,
        user_id: Option<i64>,
        filter: &SubmissionFilter,
    ) -> StoreResult<(i64, Vec<SubmissionListItem>)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count_query.push(LISTING_FROM);
        push_listing_filters(&mut count_query, user_id, filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count quiz submissions: {:?}", e);
                e
            })?;

        let mut list_query = QueryBuilder::<Postgres>::new(
            r#"
            SELECT s.id, s.set_id, s.user_id, u.username, s.correct, s.grade, s.attempt_no,
                   l.name AS lesson, c.name AS class, s.submitted_at
            "#,
        );
        list_query.push(LISTING_FROM);
        push_listing_filters(&mut list_query, user_id, filter);
        list_query
            .push(" ORDER BY s.submitted_at DESC, s.id DESC LIMIT ")
            .push_bind(i64::from(filter.limit()))
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let items = list_query
            .build_query_as::<SubmissionListItem>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch quiz submissions: {:?}", e);
                e
            })?;

        Ok((total, items))
    }

    async fn submission_stats(&self, user_id: i64) -> StoreResult<(i64, f64)> {
        let stats = sqlx::query_as::<_, (i64, f64)>(
            "SELECT COUNT(*), COALESCE(AVG(grade), 0)::FLOAT8 FROM quiz_submissions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate quiz submissions: {:?}", e);
            e
        })?;

        Ok(stats)
    }
}
