//! Mentor response DTOs

use serde::Serialize;
use uuid::Uuid;

use crate::models::{PredictedProblem, SubmissionStatus};

/// Feedback for one submission
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub status: SubmissionStatus,
    /// Empty when no hint was issued
    pub hint: String,
    pub hint_given: bool,
    pub pass_probability_on_this: f64,
    pub recommendations: Vec<ProblemRecommendation>,
    pub explanation: String,
}

/// Recommended next problem
#[derive(Debug, Serialize)]
pub struct ProblemRecommendation {
    pub id: Uuid,
    pub title: String,
    pub difficulty: String,
    pub tags: Vec<String>,
}

impl From<PredictedProblem> for ProblemRecommendation {
    fn from(p: PredictedProblem) -> Self {
        Self {
            id: p.problem_id,
            title: p.title,
            difficulty: p.difficulty,
            tags: p.tags,
        }
    }
}
