//! Process runner for submitted code
//!
//! Source is handed to the interpreter with `-c` and the test input is fed on
//! stdin. There is no containment beyond a separate process and a wall-clock
//! limit: the child can touch the filesystem and network like any other
//! process started by the server.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::{Duration, timeout};

use crate::{
    config::JudgeConfig,
    error::{AppError, AppResult},
    utils::text::tail_chars,
};

/// Maximum characters of stderr kept for a runtime error
const MAX_ERROR_CHARS: usize = 500;

/// Exit code the syntax checker uses to report a syntax error
const SYNTAX_ERROR_EXIT: i32 = 3;

/// Compiles stdin without executing it and prints `Line N: message` on failure
const SYNTAX_CHECK_SCRIPT: &str = r#"
import sys
src = sys.stdin.read()
try:
    compile(src, '<string>', 'exec')
except SyntaxError as e:
    print(f"Line {e.lineno}: {e.msg}")
    sys.exit(3)
except ValueError as e:
    print(f"Line 0: {e}")
    sys.exit(3)
"#;

/// Message reported when a stream exceeds the output cap
const OUTPUT_LIMIT_MESSAGE: &str = "Output limit exceeded";

/// Result of executing code against one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Exited with status zero
    Success { stdout: String },
    /// Non-zero exit, signal, output over the cap, or the process could not be started
    RuntimeError { message: String },
    /// Wall-clock limit exceeded; the process was killed
    TimeLimitExceeded,
}

/// Runs untrusted source code
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Statically check the source; `Ok(Some(msg))` describes a syntax error
    async fn check_syntax(&self, code: &str) -> AppResult<Option<String>>;

    /// Execute the source with `input` on stdin
    async fn execute(&self, code: &str, input: &str) -> ExecutionResult;

    /// Wall-clock limit applied to each execution
    fn timeout_secs(&self) -> u64;
}

/// Runs Python source through a local interpreter
#[derive(Debug, Clone)]
pub struct PythonRunner {
    python_bin: String,
    timeout: Duration,
    output_limit_bytes: u64,
}

/// Streams collected from a child that exited on its own
#[derive(Debug)]
struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// How one child run ended
#[derive(Debug)]
enum RunOutcome {
    Exited(Captured),
    TimedOut,
    OutputLimitExceeded,
}

#[derive(Debug)]
enum CaptureError {
    Io(std::io::Error),
    OutputLimit,
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Read a pipe to EOF, failing as soon as more than `limit` bytes arrive
async fn read_capped<R: AsyncRead + Unpin>(
    pipe: Option<R>,
    limit: u64,
) -> Result<Vec<u8>, CaptureError> {
    let mut buf = Vec::new();
    if let Some(pipe) = pipe {
        pipe.take(limit.saturating_add(1))
            .read_to_end(&mut buf)
            .await?;
    }
    if buf.len() as u64 > limit {
        return Err(CaptureError::OutputLimit);
    }
    Ok(buf)
}

impl PythonRunner {
    /// Create a runner from judge configuration
    pub fn new(config: &JudgeConfig) -> Self {
        Self {
            python_bin: config.python_bin.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            output_limit_bytes: config.output_limit_bytes,
        }
    }

    fn command(&self, script: &str) -> Command {
        let mut cmd = Command::new(&self.python_bin);
        cmd.arg("-c")
            .arg(script)
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Spawn, feed stdin, and collect output under the time and size limits
    ///
    /// The child is killed when either limit is hit.
    async fn run_with_input(&self, script: &str, input: &str) -> std::io::Result<RunOutcome> {
        let mut child = self.command(script).spawn()?;

        // Feed stdin from a separate task so a child that never reads cannot block us.
        if let Some(mut stdin) = child.stdin.take() {
            let input = input.to_owned();
            tokio::spawn(async move {
                // A child that exits early closes the pipe; that is not our error.
                let _ = stdin.write_all(input.as_bytes()).await;
                let _ = stdin.shutdown().await;
            });
        }

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.output_limit_bytes;

        // try_join stops at the first overrun instead of waiting on the other stream.
        let collect = async {
            let (stdout, stderr) =
                tokio::try_join!(read_capped(stdout, limit), read_capped(stderr, limit))?;
            let status = child.wait().await?;
            Ok::<_, CaptureError>(Captured {
                status,
                stdout,
                stderr,
            })
        };

        let outcome = match timeout(self.timeout, collect).await {
            Ok(Ok(captured)) => return Ok(RunOutcome::Exited(captured)),
            Ok(Err(CaptureError::Io(e))) => return Err(e),
            Ok(Err(CaptureError::OutputLimit)) => RunOutcome::OutputLimitExceeded,
            Err(_) => RunOutcome::TimedOut,
        };

        if let Err(e) = child.start_kill() {
            tracing::debug!(error = %e, "Child already exited");
        }
        Ok(outcome)
    }
}

#[async_trait]
impl ProcessRunner for PythonRunner {
    async fn check_syntax(&self, code: &str) -> AppResult<Option<String>> {
        let output = match self
            .run_with_input(SYNTAX_CHECK_SCRIPT, code)
            .await
            .map_err(|e| AppError::Judge(format!("Failed to start {}: {}", self.python_bin, e)))?
        {
            RunOutcome::Exited(output) => output,
            RunOutcome::TimedOut => {
                return Err(AppError::Judge("Syntax check timed out".to_string()));
            }
            RunOutcome::OutputLimitExceeded => {
                return Err(AppError::Judge("Syntax checker output too large".to_string()));
            }
        };

        if output.status.success() {
            return Ok(None);
        }

        if output.status.code() == Some(SYNTAX_ERROR_EXIT) {
            let message = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok(Some(message));
        }

        Err(AppError::Judge(format!(
            "Syntax checker failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }

    async fn execute(&self, code: &str, input: &str) -> ExecutionResult {
        let output = match self.run_with_input(code, input).await {
            Ok(RunOutcome::Exited(output)) => output,
            Ok(RunOutcome::TimedOut) => return ExecutionResult::TimeLimitExceeded,
            Ok(RunOutcome::OutputLimitExceeded) => {
                return ExecutionResult::RuntimeError {
                    message: OUTPUT_LIMIT_MESSAGE.to_string(),
                };
            }
            Err(e) => {
                tracing::warn!("Failed to start {}: {}", self.python_bin, e);
                return ExecutionResult::RuntimeError {
                    message: e.to_string(),
                };
            }
        };

        if output.status.success() {
            return ExecutionResult::Success {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            };
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        let message = if !stderr.is_empty() {
            tail_chars(stderr, MAX_ERROR_CHARS).to_string()
        } else {
            match output.status.code() {
                Some(code) => format!("Process exited with code {}", code),
                None => describe_signal(&output.status),
            }
        };

        ExecutionResult::RuntimeError { message }
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}

#[cfg(unix)]
fn describe_signal(status: &std::process::ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => format!("Killed by signal {}", signal),
        None => "Process terminated abnormally".to_string(),
    }
}

#[cfg(not(unix))]
fn describe_signal(_status: &std::process::ExitStatus) -> String {
    "Process terminated abnormally".to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Tests that need a real interpreter skip themselves when none is installed
    pub fn python_available() -> bool {
        std::process::Command::new("python3")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn runner(timeout_secs: u64) -> PythonRunner {
        PythonRunner::new(&JudgeConfig {
            timeout_secs,
            ..JudgeConfig::default()
        })
    }

    #[tokio::test]
    async fn test_echo_program() {
        if !python_available() {
            return;
        }
        let result = runner(5).execute("print(input())", "5").await;
        assert_eq!(
            result,
            ExecutionResult::Success {
                stdout: "5\n".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_runtime_error_mentions_exception() {
        if !python_available() {
            return;
        }
        match runner(5).execute("print(1 // 0)", "").await {
            ExecutionResult::RuntimeError { message } => {
                assert!(message.contains("ZeroDivisionError"), "{message}")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_infinite_loop_times_out() {
        if !python_available() {
            return;
        }
        let started = std::time::Instant::now();
        let result = runner(1).execute("while True:\n    pass", "").await;
        assert_eq!(result, ExecutionResult::TimeLimitExceeded);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_program_ignoring_large_stdin() {
        if !python_available() {
            return;
        }
        let input = "x".repeat(1 << 20);
        let result = runner(5).execute("print('done')", &input).await;
        assert_eq!(
            result,
            ExecutionResult::Success {
                stdout: "done\n".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_output_flood_is_cut_off() {
        if !python_available() {
            return;
        }
        let runner = PythonRunner::new(&JudgeConfig {
            timeout_secs: 10,
            output_limit_bytes: 64 * 1024,
            ..JudgeConfig::default()
        });

        let started = std::time::Instant::now();
        let result = runner
            .execute("import sys\nwhile True:\n    sys.stdout.write('x' * 100000)", "")
            .await;

        assert_eq!(
            result,
            ExecutionResult::RuntimeError {
                message: "Output limit exceeded".to_string()
            }
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_stderr_flood_is_cut_off() {
        if !python_available() {
            return;
        }
        let runner = PythonRunner::new(&JudgeConfig {
            output_limit_bytes: 1024,
            ..JudgeConfig::default()
        });

        let result = runner
            .execute("import sys\nsys.stderr.write('e' * 5000)\nprint('ok')", "")
            .await;
        assert_eq!(
            result,
            ExecutionResult::RuntimeError {
                message: "Output limit exceeded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_output_at_limit_is_kept() {
        if !python_available() {
            return;
        }
        let runner = PythonRunner::new(&JudgeConfig {
            output_limit_bytes: 4,
            ..JudgeConfig::default()
        });

        let result = runner.execute("print('abc')", "").await;
        assert_eq!(
            result,
            ExecutionResult::Success {
                stdout: "abc\n".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_read_capped_limits() {
        let data: &[u8] = b"hello";
        assert_eq!(read_capped(Some(data), 5).await.unwrap(), b"hello");
        assert!(matches!(
            read_capped(Some(data), 4).await,
            Err(CaptureError::OutputLimit)
        ));
        assert!(read_capped::<&[u8]>(None, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_syntax_check() {
        if !python_available() {
            return;
        }
        let runner = runner(5);
        assert_eq!(runner.check_syntax("print(1)").await.unwrap(), None);

        let message = runner.check_syntax("x = 1\ndef f(:\n").await.unwrap().unwrap();
        assert!(message.starts_with("Line 2:"), "{message}");
    }

    #[tokio::test]
    async fn test_syntax_check_does_not_execute() {
        if !python_available() {
            return;
        }
        let result = runner(5)
            .check_syntax("raise SystemExit(7)")
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let runner = PythonRunner::new(&JudgeConfig {
            python_bin: "/nonexistent/python".to_string(),
            timeout_secs: 1,
            ..JudgeConfig::default()
        });
        assert!(matches!(
            runner.execute("print(1)", "").await,
            ExecutionResult::RuntimeError { .. }
        ));
        assert!(matches!(
            runner.check_syntax("print(1)").await,
            Err(AppError::Judge(_))
        ));
    }
}
