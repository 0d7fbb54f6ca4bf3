//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod prediction;
pub mod problem;
pub mod profile;
pub mod submission;
pub mod test_case;
pub mod user;

pub use prediction::*;
pub use problem::*;
pub use profile::*;
pub use submission::*;
pub use test_case::*;
pub use user::*;
