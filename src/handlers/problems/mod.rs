//! Problem similarity handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Problem routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/{problem_id}/similar", get(handler::get_similar_problems))
}
