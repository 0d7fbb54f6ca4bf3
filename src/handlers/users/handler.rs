//! User handler implementations

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{error::AppResult, services::PredictionService, state::AppState};

use super::response::UserDifficultyPredictionsResponse;

/// All cached predictions for a user, sorted by descending pass probability
pub async fn get_difficulty_predictions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserDifficultyPredictionsResponse>> {
    let problems = PredictionService::list_predictions(state.db(), &user_id).await?;

    Ok(Json(UserDifficultyPredictionsResponse {
        user_id,
        problems: problems.into_iter().map(Into::into).collect(),
    }))
}
