//! Submission grading pipeline
//!
//! Grading runs in order and stops at the first failure:
//!
//! 1. **Syntax**: the whole source is compiled without being executed.
//! 2. **Execution**: each test case runs in its own interpreter process with
//!    the input on stdin and a wall-clock limit (`runtime` / `tle`).
//! 3. **Comparison**: trimmed stdout is compared to the trimmed expected
//!    output line by line (`wrong_answer`).
//!
//! Processes are not sandboxed; see [`runner`].

pub mod diff;
pub mod executor;
pub mod runner;

pub use executor::{CodeExecutor, GradeOutcome};
pub use runner::{ExecutionResult, ProcessRunner, PythonRunner};
