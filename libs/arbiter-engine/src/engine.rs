/// Execution Engine - Sandbox Policy Seam
///
/// **Core Responsibility:**
/// Run a compiled binary once with a given stdin under given limits and
/// report what happened.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to execute
/// - Engine does NOT compare outputs or decide pass/fail
/// - Engine returns raw outcomes for the case runner to classify
///
/// The shipped `TimeoutSandbox` only bounds wall-clock time. Stronger
/// isolation (cgroups, seccomp, containers) plugs in as another
/// `SandboxPolicy` without touching the case runner.

use crate::process::{run_with_deadline, Completion, DEFAULT_CAPTURE_LIMIT};
use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Limits applied to a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub wall_time: Duration,
    /// Bytes kept per output stream; anything beyond is discarded
    pub output_bytes: usize,
}

impl RunLimits {
    pub fn new(wall_time: Duration) -> Self {
        Self {
            wall_time,
            output_bytes: DEFAULT_CAPTURE_LIMIT,
        }
    }

    pub fn with_output_limit(mut self, output_bytes: usize) -> Self {
        self.output_bytes = output_bytes;
        self
    }
}

/// Captured streams of a process that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Raw outcome of one run, with no verdict attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Exited { code: i32, output: RunOutput },
    Signaled { signal: i32, output: RunOutput },
    TimedOut { elapsed: Duration },
}

/// Pluggable execution backend for untrusted binaries
#[async_trait]
pub trait SandboxPolicy: Send + Sync {
    /// Run `binary` with no arguments, `stdin` on standard input.
    ///
    /// Must not return until the process is terminated and reaped.
    /// `Err` means the process could not be started at all.
    async fn execute(&self, binary: &Path, stdin: &str, limits: &RunLimits)
        -> io::Result<RunOutcome>;
}

/// Wall-clock-only policy: spawn, race exit against the timer, kill on timeout
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeoutSandbox;

#[async_trait]
impl SandboxPolicy for TimeoutSandbox {
    async fn execute(
        &self,
        binary: &Path,
        stdin: &str,
        limits: &RunLimits,
    ) -> io::Result<RunOutcome> {
        let mut cmd = Command::new(binary);
        let (completion, elapsed) =
            run_with_deadline(&mut cmd, Some(stdin.as_bytes()), limits.wall_time, limits.output_bytes)
                .await?;

        let outcome = match completion {
            Completion::Exited { status, stdout, stderr } => {
                let output = RunOutput {
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                    elapsed,
                };
                match termination_signal(&status) {
                    Some(signal) => RunOutcome::Signaled { signal, output },
                    None => RunOutcome::Exited {
                        code: status.code().unwrap_or(-1),
                        output,
                    },
                }
            }
            Completion::TimedOut => RunOutcome::TimedOut { elapsed },
        };

        debug!(
            binary = %binary.display(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Sandboxed run finished"
        );

        Ok(outcome)
    }
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Render a limit the way users see it in messages: `2s`, `0.5s`
pub fn format_limit(limit: &Duration) -> String {
    format!("{}s", limit.as_secs_f64())
}
