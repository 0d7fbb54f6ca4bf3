//! Business logic services

pub mod prediction_service;
pub mod problem_service;
pub mod submission_service;

pub use prediction_service::PredictionService;
pub use problem_service::{EmbeddingReport, ProblemService};
pub use submission_service::{Pipeline, SubmissionService};
