//! Difficulty prediction repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{DifficultyPrediction, PredictedProblem},
};

/// Repository for cached pass probabilities
pub struct PredictionRepository;

impl PredictionRepository {
    /// Write a batch of `(problem_id, pass_probability)` rows for one user
    ///
    /// The batch lands in a single transaction; readers never observe a
    /// half-refreshed catalogue.
    pub async fn upsert_all(pool: &PgPool, user_id: &Uuid, rows: &[(Uuid, f64)]) -> AppResult<()> {
        let mut tx = pool.begin().await?;

        for (problem_id, probability) in rows {
            sqlx::query(
                r#"
                INSERT INTO difficulty_predictions (user_id, problem_id, pass_probability)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, problem_id) DO UPDATE SET
                    pass_probability = EXCLUDED.pass_probability,
                    updated_at = NOW()
                "#,
            )
            .bind(user_id)
            .bind(problem_id)
            .bind(probability)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Find the prediction for one pair
    pub async fn find(
        pool: &PgPool,
        user_id: &Uuid,
        problem_id: &Uuid,
    ) -> AppResult<Option<DifficultyPrediction>> {
        let prediction = sqlx::query_as::<_, DifficultyPrediction>(
            r#"SELECT * FROM difficulty_predictions WHERE user_id = $1 AND problem_id = $2"#,
        )
        .bind(user_id)
        .bind(problem_id)
        .fetch_optional(pool)
        .await?;

        Ok(prediction)
    }

    /// Drop the prediction for a solved problem
    pub async fn delete(pool: &PgPool, user_id: &Uuid, problem_id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"DELETE FROM difficulty_predictions WHERE user_id = $1 AND problem_id = $2"#,
        )
        .bind(user_id)
        .bind(problem_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All predictions for a user, most likely pass first
    pub async fn list_for_user(pool: &PgPool, user_id: &Uuid) -> AppResult<Vec<PredictedProblem>> {
        let predictions = sqlx::query_as::<_, PredictedProblem>(
            r#"
            SELECT
                dp.problem_id,
                p.title,
                p.difficulty,
                p.tags,
                dp.pass_probability
            FROM difficulty_predictions dp
            JOIN problems p ON p.id = dp.problem_id
            WHERE dp.user_id = $1
            ORDER BY dp.pass_probability DESC, p.title
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(predictions)
    }
}
