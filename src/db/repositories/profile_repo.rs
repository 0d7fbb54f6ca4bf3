//! User profile repository

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{error::AppResult, models::UserProfile};

/// Repository for user profile database operations
pub struct ProfileRepository;

impl ProfileRepository {
    /// Find the profile for a user
    pub async fn find_by_user(pool: &PgPool, user_id: &Uuid) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"SELECT * FROM user_profiles WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Create an empty profile unless one exists
    pub async fn ensure_exists(conn: &mut PgConnection, user_id: &Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Apply one graded attempt under a row lock
    ///
    /// Concurrent submissions from the same user serialise on the profile row,
    /// so no running-average update is lost.
    pub async fn record_attempt(
        pool: &PgPool,
        user_id: &Uuid,
        accepted: bool,
        time_spent_seconds: i32,
        edits: u32,
    ) -> AppResult<UserProfile> {
        let mut tx = pool.begin().await?;

        Self::ensure_exists(&mut tx, user_id).await?;

        let mut profile = sqlx::query_as::<_, UserProfile>(
            r#"SELECT * FROM user_profiles WHERE user_id = $1 FOR UPDATE"#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        profile.record_attempt(accepted, time_spent_seconds, edits);

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles
            SET
                total_solved = $2,
                total_attempts = $3,
                avg_time_per_solve = $4,
                avg_edits = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(profile.total_solved)
        .bind(profile.total_attempts)
        .bind(profile.avg_time_per_solve)
        .bind(profile.avg_edits)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(profile)
    }
}
