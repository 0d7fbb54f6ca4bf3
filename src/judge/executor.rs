//! Submission grading
//!
//! Grading short-circuits: the first failing check decides the status and
//! later test cases are never run.

use std::sync::Arc;

use crate::{error::AppResult, models::SubmissionStatus};

use super::{
    diff::compare_output,
    runner::{ExecutionResult, ProcessRunner},
};

/// Status plus human-readable explanation for one graded submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub status: SubmissionStatus,
    pub analysis: String,
}

impl GradeOutcome {
    fn new(status: SubmissionStatus, analysis: impl Into<String>) -> Self {
        Self {
            status,
            analysis: analysis.into(),
        }
    }
}

/// Grades submissions against ordered test cases
#[derive(Clone)]
pub struct CodeExecutor {
    runner: Arc<dyn ProcessRunner>,
}

impl CodeExecutor {
    /// Create an executor on top of a process runner
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Grade source against `(input, expected_output)` pairs
    ///
    /// Only failures of the grading machinery itself (the syntax checker could
    /// not run) are errors; everything the submission does is an outcome.
    pub async fn grade(&self, code: &str, tests: &[(&str, &str)]) -> AppResult<GradeOutcome> {
        if let Some(message) = self.runner.check_syntax(code).await? {
            return Ok(GradeOutcome::new(
                SubmissionStatus::Syntax,
                format!("Syntax error: {}", message),
            ));
        }

        for (index, (input, expected)) in tests.iter().enumerate() {
            match self.runner.execute(code, input).await {
                ExecutionResult::TimeLimitExceeded => {
                    tracing::debug!(test = index + 1, "Time limit exceeded");
                    return Ok(GradeOutcome::new(
                        SubmissionStatus::Tle,
                        format!(
                            "Code runs too slowly (timeout after {}s)",
                            self.runner.timeout_secs()
                        ),
                    ));
                }
                ExecutionResult::RuntimeError { message } => {
                    tracing::debug!(test = index + 1, "Runtime error");
                    return Ok(GradeOutcome::new(
                        SubmissionStatus::Runtime,
                        format!("Runtime error: {}", message),
                    ));
                }
                ExecutionResult::Success { stdout } => {
                    if let Some(diff) = compare_output(&stdout, expected) {
                        tracing::debug!(test = index + 1, "Wrong answer");
                        return Ok(GradeOutcome::new(SubmissionStatus::WrongAnswer, diff));
                    }
                }
            }
        }

        Ok(GradeOutcome::new(SubmissionStatus::Accepted, "All tests passed"))
    }
}
