//! Per-user prediction handlers

mod handler;
pub mod response;

pub use handler::*;
pub use response::*;

use axum::{Router, routing::get};

use crate::state::AppState;

/// User routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/{user_id}/difficulty-predictions",
        get(handler::get_difficulty_predictions),
    )
}
