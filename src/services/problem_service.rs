//! Problem service
//!
//! Embedding upkeep and similarity search over stored problem embeddings.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::repositories::ProblemRepository,
    embeddings::{Embedder, cosine_similarity, deserialize_embedding, serialize_embedding},
    error::{AppError, AppResult},
    handlers::problems::response::SimilarProblem,
    models::Problem,
};

/// Outcome of an embedding pass over the catalogue
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingReport {
    pub embedded: usize,
    pub failed: usize,
}

/// Problem service for business logic
pub struct ProblemService;

impl ProblemService {
    /// Problems most similar to `problem_id`, best first
    pub async fn similar_problems(
        pool: &PgPool,
        problem_id: &Uuid,
        limit: usize,
    ) -> AppResult<Vec<SimilarProblem>> {
        let source = ProblemRepository::find_by_id(pool, problem_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

        let source_vector = source
            .embedding
            .as_deref()
            .and_then(deserialize_embedding)
            .ok_or_else(|| {
                AppError::InvalidInput("Problem has no embedding yet".to_string())
            })?;

        let candidates = ProblemRepository::list_with_embeddings(pool).await?;

        Ok(Self::rank_similar(&source, &source_vector, candidates, limit))
    }

    /// Rank candidates by cosine similarity to `source_vector`
    ///
    /// The source problem and rows whose embedding cannot be decoded are skipped.
    pub fn rank_similar(
        source: &Problem,
        source_vector: &[f32],
        candidates: Vec<Problem>,
        limit: usize,
    ) -> Vec<SimilarProblem> {
        let mut ranked: Vec<SimilarProblem> = candidates
            .into_iter()
            .filter(|p| p.id != source.id)
            .filter_map(|p| {
                let vector = p.embedding.as_deref().and_then(deserialize_embedding)?;
                let similarity = cosine_similarity(source_vector, &vector);
                Some(SimilarProblem {
                    id: p.id,
                    title: p.title,
                    difficulty: p.difficulty,
                    tags: p.tags,
                    similarity,
                })
            })
            .collect();

        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        ranked.truncate(limit);
        ranked
    }

    /// Compute and store an embedding for every problem
    ///
    /// A failing problem is logged and skipped so one bad row does not stop the pass.
    pub async fn embed_all(pool: &PgPool, embedder: &dyn Embedder) -> AppResult<EmbeddingReport> {
        let problems = ProblemRepository::list_all(pool).await?;
        let mut report = EmbeddingReport::default();

        for problem in &problems {
            match embedder.embed(&problem.embedding_text()).await {
                Ok(vector) => {
                    ProblemRepository::set_embedding(pool, &problem.id, &serialize_embedding(&vector))
                        .await?;
                    report.embedded += 1;
                }
                Err(e) => {
                    tracing::warn!(problem_id = %problem.id, error = %e, "Failed to embed problem");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            model = embedder.model_name(),
            embedded = report.embedded,
            failed = report.failed,
            "Embedding pass finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::problem::fixtures::problem;

    fn with_embedding(title: &str, vector: &[f32]) -> Problem {
        let mut p = problem(title, "easy", &["array"]);
        p.embedding = Some(serialize_embedding(vector));
        p
    }

    #[test]
    fn test_rank_similar_orders_and_excludes_source() {
        let source = with_embedding("Source", &[1.0, 0.0]);
        let candidates = vec![
            source.clone(),
            with_embedding("Orthogonal", &[0.0, 1.0]),
            with_embedding("Close", &[0.9, 0.1]),
            with_embedding("Same", &[2.0, 0.0]),
        ];

        let ranked = ProblemService::rank_similar(&source, &[1.0, 0.0], candidates, 5);
        let titles: Vec<_> = ranked.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Same", "Close", "Orthogonal"]);
    }

    #[test]
    fn test_rank_similar_respects_limit_and_skips_corrupt_rows() {
        let source = with_embedding("Source", &[1.0, 0.0]);
        let mut corrupt = problem("Corrupt", "easy", &[]);
        corrupt.embedding = Some(vec![1, 2, 3]);

        let candidates = vec![
            corrupt,
            with_embedding("A", &[1.0, 0.0]),
            with_embedding("B", &[0.5, 0.5]),
        ];

        let ranked = ProblemService::rank_similar(&source, &[1.0, 0.0], candidates, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "A");
    }
}
