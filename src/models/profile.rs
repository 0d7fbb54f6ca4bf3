//! User profile model
//!
//! One row per user holding running aggregates that feed the difficulty model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User profile database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_solved: i32,
    pub total_attempts: i32,
    pub avg_time_per_solve: f64,
    pub avg_edits: f64,
    pub updated_at: DateTime<Utc>,
}

/// Fold one more observation into a running mean over `n` observations
///
/// `n` already counts the new observation.
pub fn incremental_average(previous: f64, n: i32, value: f64) -> f64 {
    if n <= 0 {
        return previous;
    }
    let n = f64::from(n);
    (previous * (n - 1.0) + value) / n
}

impl UserProfile {
    /// Fresh profile with zeroed aggregates
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            total_solved: 0,
            total_attempts: 0,
            avg_time_per_solve: 0.0,
            avg_edits: 0.0,
            updated_at: Utc::now(),
        }
    }

    /// Apply one graded attempt
    ///
    /// Accepted attempts move the solve-time average (when a time was reported);
    /// failed attempts move the edit-count average.
    pub fn record_attempt(&mut self, accepted: bool, time_spent_seconds: i32, edits: u32) {
        self.total_attempts += 1;

        if accepted {
            self.total_solved += 1;
            if time_spent_seconds > 0 {
                self.avg_time_per_solve = incremental_average(
                    self.avg_time_per_solve,
                    self.total_solved,
                    f64::from(time_spent_seconds),
                );
            }
        } else {
            self.avg_edits =
                incremental_average(self.avg_edits, self.total_attempts, f64::from(edits));
        }

        self.updated_at = Utc::now();
    }
}
