//! User response DTOs

use serde::Serialize;
use uuid::Uuid;

use crate::{models::PredictedProblem, utils::round_to};

/// Cached pass probabilities for one user, most likely pass first
#[derive(Debug, Serialize)]
pub struct UserDifficultyPredictionsResponse {
    pub user_id: Uuid,
    pub problems: Vec<ProblemWithProbability>,
}

/// Problem summary with its pass probability
#[derive(Debug, Serialize)]
pub struct ProblemWithProbability {
    pub id: Uuid,
    pub title: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    /// Rounded to three decimals
    pub pass_probability: f64,
}

impl From<PredictedProblem> for ProblemWithProbability {
    fn from(p: PredictedProblem) -> Self {
        Self {
            id: p.problem_id,
            title: p.title,
            difficulty: p.difficulty,
            tags: p.tags,
            pass_probability: round_to(p.pass_probability, 3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_is_rounded() {
        let row = ProblemWithProbability::from(PredictedProblem {
            problem_id: Uuid::nil(),
            title: "Two Sum".to_string(),
            difficulty: "easy".to_string(),
            tags: vec!["array".to_string()],
            pass_probability: 0.123_456,
        });
        assert_eq!(row.pass_probability, 0.123);
    }
}
