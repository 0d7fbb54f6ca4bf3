//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod prediction_repo;
pub mod problem_repo;
pub mod profile_repo;
pub mod submission_repo;
pub mod user_repo;

pub use prediction_repo::PredictionRepository;
pub use problem_repo::ProblemRepository;
pub use profile_repo::ProfileRepository;
pub use submission_repo::SubmissionRepository;
pub use user_repo::UserRepository;
