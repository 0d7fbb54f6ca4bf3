//! Problem repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Problem, TestCase},
};

/// Repository for problem database operations
pub struct ProblemRepository;

impl ProblemRepository {
    /// Create a new problem
    pub async fn create(
        pool: &PgPool,
        title: &str,
        difficulty: &str,
        tags: &[String],
        description: Option<&str>,
        reference_solution: Option<&str>,
    ) -> AppResult<Problem> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"
            INSERT INTO problems (title, difficulty, tags, description, reference_solution)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(difficulty)
        .bind(tags)
        .bind(description)
        .bind(reference_solution)
        .fetch_one(pool)
        .await?;

        Ok(problem)
    }

    /// Find problem by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(r#"SELECT * FROM problems WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(problem)
    }

    /// The whole catalogue
    pub async fn list_all(pool: &PgPool) -> AppResult<Vec<Problem>> {
        let problems =
            sqlx::query_as::<_, Problem>(r#"SELECT * FROM problems ORDER BY created_at, id"#)
                .fetch_all(pool)
                .await?;

        Ok(problems)
    }

    /// Problems the user has not solved yet
    pub async fn list_unsolved(pool: &PgPool, user_id: &Uuid) -> AppResult<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            r#"
            SELECT p.* FROM problems p
            WHERE NOT EXISTS (
                SELECT 1 FROM submissions s
                WHERE s.user_id = $1 AND s.problem_id = p.id AND s.status = 'accepted'
            )
            ORDER BY p.created_at, p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(problems)
    }

    /// Problems with a stored embedding
    pub async fn list_with_embeddings(pool: &PgPool) -> AppResult<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            r#"SELECT * FROM problems WHERE embedding IS NOT NULL ORDER BY created_at, id"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(problems)
    }

    /// Store an encoded embedding
    pub async fn set_embedding(pool: &PgPool, id: &Uuid, embedding: &[u8]) -> AppResult<()> {
        sqlx::query(r#"UPDATE problems SET embedding = $2 WHERE id = $1"#)
            .bind(id)
            .bind(embedding)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Append a test case
    pub async fn add_test_case(
        pool: &PgPool,
        problem_id: &Uuid,
        position: i32,
        input_data: &str,
        expected_output: &str,
    ) -> AppResult<TestCase> {
        let test_case = sqlx::query_as::<_, TestCase>(
            r#"
            INSERT INTO problem_tests (problem_id, position, input_data, expected_output)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(problem_id)
        .bind(position)
        .bind(input_data)
        .bind(expected_output)
        .fetch_one(pool)
        .await?;

        Ok(test_case)
    }

    /// Test cases in grading order
    pub async fn get_test_cases(pool: &PgPool, problem_id: &Uuid) -> AppResult<Vec<TestCase>> {
        let test_cases = sqlx::query_as::<_, TestCase>(
            r#"
            SELECT * FROM problem_tests
            WHERE problem_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(problem_id)
        .fetch_all(pool)
        .await?;

        Ok(test_cases)
    }
}
