//! Submission repository
//!
//! Submissions are append-only; the hint flag is the one column written after
//! the row is created.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Submission, SubmissionStatus},
};

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Record a graded attempt
    pub async fn create(
        pool: &PgPool,
        user_id: &Uuid,
        problem_id: &Uuid,
        code: &str,
        status: SubmissionStatus,
        failure_analysis: &str,
        time_spent_seconds: i32,
    ) -> AppResult<Submission> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (user_id, problem_id, code, status, failure_analysis, time_spent_seconds)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(problem_id)
        .bind(code)
        .bind(status.as_str())
        .bind(failure_analysis)
        .bind(time_spent_seconds)
        .fetch_one(pool)
        .await?;

        Ok(submission)
    }

    /// Mark that a hint was shown for this attempt
    pub async fn set_hint_given(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"UPDATE submissions SET hint_given = TRUE WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
