//! Submission and feedback handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Mentor routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(handler::submit_solution))
        .route("/submit/", post(handler::submit_solution))
}
