//! Personalized difficulty prediction model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Cached pass probability for one (user, problem) pair
///
/// A row only exists while the user has not solved the problem.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DifficultyPrediction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub problem_id: Uuid,
    pub pass_probability: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Prediction joined with the problem it refers to
#[derive(Debug, Clone, FromRow)]
pub struct PredictedProblem {
    pub problem_id: Uuid,
    pub title: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub pass_probability: f64,
}
