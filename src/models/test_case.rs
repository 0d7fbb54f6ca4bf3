//! Test case model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Test case database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestCase {
    pub id: Uuid,
    pub problem_id: Uuid,
    pub position: i32,
    pub input_data: String,
    pub expected_output: String,
}

impl TestCase {
    /// The (input, expected output) pair fed to the judge
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.input_data, &self.expected_output)
    }
}
