//! CP Mentor - Competitive Programming Tutor Backend
//!
//! Grades Python submissions against stored test cases, keeps a per-user
//! estimate of how likely each unsolved problem is to be passed, and produces
//! hints and next-problem recommendations.
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Repositories**: Database access
//! - **Models**: Domain models and DTOs
//!
//! Grading lives in [`judge`], the classifiers in [`ml`], problem embeddings
//! in [`embeddings`] and generated feedback in [`mentor`].

pub mod config;
pub mod constants;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod handlers;
pub mod judge;
pub mod mentor;
pub mod middleware;
pub mod ml;
pub mod models;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
