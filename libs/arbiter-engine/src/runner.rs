// Per-case execution: Starting → Running → {Completed | TimedOut | RuntimeFailed}

use crate::engine::{RunLimits, RunOutcome, SandboxPolicy};
use crate::evaluator::evaluate_case;
use arbiter_common::types::{ExecutionResult, TestCase};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Terminal state of one case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseState {
    /// Exit status 0 within the limit; `stdout` as captured
    Completed { stdout: String },
    TimedOut,
    /// Non-zero exit, killed by a signal, or could not be spawned
    RuntimeFailed { detail: String },
}

impl CaseState {
    fn from_outcome(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Exited { code: 0, output } => CaseState::Completed {
                stdout: output.stdout,
            },
            RunOutcome::Exited { output, .. } => CaseState::RuntimeFailed {
                detail: output.stderr,
            },
            RunOutcome::Signaled { signal, output } => CaseState::RuntimeFailed {
                detail: if output.stderr.trim().is_empty() {
                    format!("terminated by signal {}", signal)
                } else {
                    output.stderr
                },
            },
            RunOutcome::TimedOut { .. } => CaseState::TimedOut,
        }
    }
}

/// Runs a compiled binary against one test case at a time.
/// Each call owns exactly one subprocess.
#[derive(Clone)]
pub struct CaseRunner {
    sandbox: Arc<dyn SandboxPolicy>,
    limits: RunLimits,
}

impl CaseRunner {
    pub fn new(sandbox: Arc<dyn SandboxPolicy>, limits: RunLimits) -> Self {
        Self { sandbox, limits }
    }

    /// Never fails: every terminal state becomes a populated result
    pub async fn run_case(
        &self,
        binary: &Path,
        test_case: &TestCase,
        case_number: usize,
    ) -> ExecutionResult {
        debug!(case_number, "Starting test case");

        let state = match self.sandbox.execute(binary, &test_case.input, &self.limits).await {
            Ok(outcome) => CaseState::from_outcome(outcome),
            Err(e) => CaseState::RuntimeFailed {
                detail: format!("failed to start program: {}", e),
            },
        };

        match &state {
            CaseState::Completed { .. } => debug!(case_number, "Test case completed"),
            CaseState::TimedOut => warn!(
                case_number,
                limit_ms = self.limits.wall_time.as_millis() as u64,
                "Test case timed out"
            ),
            CaseState::RuntimeFailed { detail } => warn!(
                case_number,
                error_preview = detail.lines().next().unwrap_or(""),
                "Test case had runtime error"
            ),
        }

        evaluate_case(&state, test_case, case_number, &self.limits.wall_time)
    }
}
