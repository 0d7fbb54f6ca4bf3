//! Submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::constants::statuses;

/// Submission database model (append-only)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub problem_id: Uuid,
    #[serde(skip_serializing)]
    pub code: String,
    pub status: String,
    pub failure_analysis: Option<String>,
    pub hint_given: bool,
    pub time_spent_seconds: i32,
    pub created_at: DateTime<Utc>,
}

/// Outcome of grading one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Source does not parse
    Syntax,
    /// Non-zero exit on some test case
    Runtime,
    /// Wall-clock limit hit on some test case
    Tle,
    /// Output differs from the expected output
    WrongAnswer,
    /// Every test case matched
    Accepted,
}

impl SubmissionStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => statuses::SYNTAX,
            Self::Runtime => statuses::RUNTIME,
            Self::Tle => statuses::TLE,
            Self::WrongAnswer => statuses::WRONG_ANSWER,
            Self::Accepted => statuses::ACCEPTED,
        }
    }

    /// Check if this status means the solution was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
