//! Prediction service
//!
//! Keeps the per-user pass-probability cache in step with the user's profile
//! and the loaded difficulty classifier.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::repositories::{PredictionRepository, ProblemRepository, ProfileRepository, UserRepository},
    error::{AppError, AppResult},
    ml::{BinaryClassifier, ModelError, ModelRegistry, difficulty_features},
    models::{PredictedProblem, Problem, UserProfile},
};

/// Prediction service for business logic
pub struct PredictionService;

impl PredictionService {
    /// Score every problem with one classifier snapshot
    pub fn score_problems(
        classifier: &BinaryClassifier,
        profile: Option<&UserProfile>,
        problems: &[Problem],
    ) -> Result<Vec<(Uuid, f64)>, ModelError> {
        problems
            .iter()
            .map(|problem| {
                let features = difficulty_features(profile, problem);
                classifier
                    .predict_proba(&features)
                    .map(|p| (problem.id, p))
            })
            .collect()
    }

    /// Recompute predictions for every problem the user has not solved
    ///
    /// Returns the number of rows written.
    pub async fn refresh_for_user(
        pool: &PgPool,
        models: &ModelRegistry,
        user_id: &Uuid,
    ) -> AppResult<usize> {
        let profile = ProfileRepository::find_by_user(pool, user_id).await?;
        let problems = ProblemRepository::list_unsolved(pool, user_id).await?;
        let classifier = models.difficulty.current().await;

        let rows = Self::score_problems(&classifier, profile.as_ref(), &problems)?;
        PredictionRepository::upsert_all(pool, user_id, &rows).await?;

        tracing::debug!(user_id = %user_id, rows = rows.len(), "Refreshed predictions");

        Ok(rows.len())
    }

    /// Create the user's profile if needed and fill the prediction cache
    pub async fn init_for_user(
        pool: &PgPool,
        models: &ModelRegistry,
        user_id: &Uuid,
    ) -> AppResult<usize> {
        UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput("User not found".to_string()))?;

        let mut conn = pool.acquire().await?;
        ProfileRepository::ensure_exists(&mut conn, user_id).await?;
        drop(conn);

        Self::refresh_for_user(pool, models, user_id).await
    }

    /// Cached predictions for a user, most likely pass first
    pub async fn list_predictions(pool: &PgPool, user_id: &Uuid) -> AppResult<Vec<PredictedProblem>> {
        UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput("User not found".to_string()))?;

        let predictions = PredictionRepository::list_for_user(pool, user_id).await?;
        if predictions.is_empty() {
            return Err(AppError::InvalidInput(
                "No predictions found. Train models and submit solutions first.".to_string(),
            ));
        }

        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DIFFICULTY_FEATURE_DIM;
    use crate::ml::classifier::tests::logistic;
    use crate::models::problem::fixtures::problem;

    /// Weights only the difficulty ordinal: harder problems score lower
    fn difficulty_sensitive() -> BinaryClassifier {
        let mut weights = vec![0.0; DIFFICULTY_FEATURE_DIM];
        weights[6] = -1.0;
        logistic(weights, 0.5)
    }

    #[test]
    fn test_scores_follow_difficulty() {
        let problems = vec![
            problem("Easy", "easy", &["array"]),
            problem("Hard", "hard", &["dp"]),
        ];
        let rows = PredictionService::score_problems(&difficulty_sensitive(), None, &problems).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, problems[0].id);
        assert!(rows[0].1 > rows[1].1);
        assert!(rows.iter().all(|(_, p)| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let problems = vec![
            problem("A", "medium", &["graph", "greedy"]),
            problem("B", "easy", &["string"]),
        ];
        let mut profile = UserProfile::empty(Uuid::new_v4());
        profile.record_attempt(true, 90, 0);

        let clf = difficulty_sensitive();
        let first = PredictionService::score_problems(&clf, Some(&profile), &problems).unwrap();
        let second = PredictionService::score_problems(&clf, Some(&profile), &problems).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_catalogue_scores_nothing() {
        let rows = PredictionService::score_problems(&difficulty_sensitive(), None, &[]).unwrap();
        assert!(rows.is_empty());
    }
}
