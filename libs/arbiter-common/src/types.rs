use serde::{Deserialize, Serialize};
use std::fmt;

/// Which case set the caller assembled upstream.
///
/// The engine never branches on this; it only runs the final ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Sample cases plus caller-supplied custom cases
    #[default]
    Run,
    /// Sample cases plus hidden cases
    Submit,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Run => write!(f, "run"),
            Mode::Submit => write!(f, "submit"),
        }
    }
}

impl Mode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "run" => Some(Mode::Run),
            "submit" => Some(Mode::Submit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    /// Empty means "no known answer": the case passes if the program exits cleanly.
    #[serde(default)]
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            explanation: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub source: String,
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub mode: Mode,
}

/// Verdict for a single test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// 1-based position in the submitted case list
    pub case_number: usize,
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub success: bool,
    pub results: Vec<ExecutionResult>,
    pub total_passed: usize,
    pub total_cases: usize,
}

impl ExecutionSummary {
    /// Build a summary over a complete, ordered result set.
    pub fn from_results(results: Vec<ExecutionResult>) -> Self {
        let total_passed = results.iter().filter(|r| r.passed).count();
        let total_cases = results.len();

        Self {
            success: total_passed == total_cases,
            results,
            total_passed,
            total_cases,
        }
    }
}
