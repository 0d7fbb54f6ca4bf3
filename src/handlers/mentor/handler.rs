//! Mentor handler implementations

use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    error::AppResult,
    services::{Pipeline, SubmissionService},
    state::AppState,
};

use super::{request::SubmitSolutionRequest, response::SubmissionResponse};

/// Grade a solution and return mentor feedback
///
/// Failures past input validation are reported as a generic submission error
/// carrying the underlying message.
pub async fn submit_solution(
    State(state): State<AppState>,
    Json(payload): Json<SubmitSolutionRequest>,
) -> AppResult<Json<SubmissionResponse>> {
    payload.validate()?;

    let response = SubmissionService::submit(Pipeline::from(&state), payload)
        .await
        .map_err(|e| e.into_submission_failure())?;

    Ok(Json(response))
}
