//! Problem response DTOs

use serde::Serialize;
use uuid::Uuid;

/// Problems ranked by embedding similarity to a source problem
#[derive(Debug, Serialize)]
pub struct SimilarProblemsResponse {
    pub problem_id: Uuid,
    pub problems: Vec<SimilarProblem>,
}

/// One similar problem
#[derive(Debug, Serialize)]
pub struct SimilarProblem {
    pub id: Uuid,
    pub title: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
}
