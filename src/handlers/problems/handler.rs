//! Problem handler implementations

use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppResult, services::ProblemService, state::AppState};

use super::{request::SimilarProblemsQuery, response::SimilarProblemsResponse};

/// Problems whose stored embeddings are closest to this one
pub async fn get_similar_problems(
    State(state): State<AppState>,
    Path(problem_id): Path<Uuid>,
    Query(query): Query<SimilarProblemsQuery>,
) -> AppResult<Json<SimilarProblemsResponse>> {
    query.validate()?;

    let problems = ProblemService::similar_problems(state.db(), &problem_id, query.limit()).await?;

    Ok(Json(SimilarProblemsResponse {
        problem_id,
        problems,
    }))
}
