/// Case Evaluator - Output Comparison and Verdicts
///
/// **Core Responsibility:**
/// Turn a case's terminal state into an `ExecutionResult`.
///
/// **Critical Properties:**
/// - Knows nothing about processes or timers
/// - Pure function: (terminal state, test case) → verdict
///
/// **Comparison Rules:**
/// - Trim leading/trailing whitespace: YES
/// - Internal whitespace normalization: NO
/// - Case sensitivity: YES (exact match required)
/// - Numeric tolerance: NO
/// - Empty expected output: passes on any clean exit

use crate::engine::format_limit;
use crate::runner::CaseState;
use arbiter_common::types::{ExecutionResult, TestCase};
use std::time::Duration;

fn normalize_output(output: &str) -> &str {
    output.trim()
}

/// Pass criterion for a clean exit
pub fn output_matches(actual: &str, expected: &str) -> bool {
    let expected = normalize_output(expected);
    if expected.is_empty() {
        // No known answer (custom input): a clean exit is enough
        return true;
    }
    normalize_output(actual) == expected
}

pub fn timeout_message(limit: &Duration) -> String {
    format!("Execution timeout ({} limit exceeded)", format_limit(limit))
}

pub fn runtime_error_message(detail: &str) -> String {
    format!("Runtime error: {}", detail)
}

/// Build the verdict for one case from its terminal state
pub fn evaluate_case(
    state: &CaseState,
    test_case: &TestCase,
    case_number: usize,
    limit: &Duration,
) -> ExecutionResult {
    let mut result = ExecutionResult {
        case_number,
        input: test_case.input.clone(),
        expected_output: test_case.expected_output.clone(),
        actual_output: String::new(),
        passed: false,
        error: None,
    };

    match state {
        CaseState::Completed { stdout } => {
            let actual = normalize_output(stdout);
            result.passed = output_matches(actual, &test_case.expected_output);
            result.actual_output = actual.to_string();
        }
        CaseState::TimedOut => {
            result.error = Some(timeout_message(limit));
        }
        CaseState::RuntimeFailed { detail } => {
            result.error = Some(runtime_error_message(detail));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: Duration = Duration::from_secs(2);

    fn completed(stdout: &str) -> CaseState {
        CaseState::Completed {
            stdout: stdout.to_string(),
        }
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(normalize_output("hello"), "hello");
        assert_eq!(normalize_output("  hello  "), "hello");
        assert_eq!(normalize_output("\nhello\r\n"), "hello");
        assert_eq!(normalize_output("  hello world  \n"), "hello world");
        assert_eq!(normalize_output("   "), "");
    }

    #[test]
    fn test_exact_match_passes() {
        let case = TestCase::new("2 2", "4");
        let result = evaluate_case(&completed("4\n"), &case, 1, &LIMIT);

        assert!(result.passed);
        assert_eq!(result.case_number, 1);
        assert_eq!(result.actual_output, "4");
        assert_eq!(result.input, "2 2");
        assert_eq!(result.expected_output, "4");
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let case = TestCase::new("", "  hello\n");
        assert!(evaluate_case(&completed("\n hello  \n"), &case, 1, &LIMIT).passed);
    }

    #[test]
    fn test_internal_whitespace_is_significant() {
        let case = TestCase::new("", "1 2");
        assert!(!evaluate_case(&completed("1  2"), &case, 1, &LIMIT).passed);

        let case = TestCase::new("", "line1\nline2");
        assert!(evaluate_case(&completed("line1\nline2\n"), &case, 1, &LIMIT).passed);
        assert!(!evaluate_case(&completed("line1\r\nline2\n"), &case, 1, &LIMIT).passed);
    }

    #[test]
    fn test_case_sensitive() {
        let case = TestCase::new("", "Hello");
        let result = evaluate_case(&completed("hello"), &case, 3, &LIMIT);
        assert!(!result.passed);
        assert_eq!(result.actual_output, "hello");
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_no_numeric_tolerance() {
        let case = TestCase::new("", "0.5");
        assert!(!evaluate_case(&completed("0.50"), &case, 1, &LIMIT).passed);
    }

    #[test]
    fn test_empty_expected_passes_on_clean_exit() {
        let case = TestCase::new("42", "");
        let result = evaluate_case(&completed("anything at all"), &case, 1, &LIMIT);
        assert!(result.passed);
        assert_eq!(result.actual_output, "anything at all");

        let case = TestCase::new("42", " \n ");
        assert!(evaluate_case(&completed(""), &case, 1, &LIMIT).passed);
    }

    #[test]
    fn test_empty_expected_still_fails_on_runtime_error() {
        let case = TestCase::new("42", "");
        let state = CaseState::RuntimeFailed {
            detail: "segfault".to_string(),
        };
        let result = evaluate_case(&state, &case, 1, &LIMIT);
        assert!(!result.passed);
        assert_eq!(result.error.as_deref(), Some("Runtime error: segfault"));
    }

    #[test]
    fn test_timeout_verdict() {
        let case = TestCase::new("", "5");
        let result = evaluate_case(&CaseState::TimedOut, &case, 2, &LIMIT);

        assert!(!result.passed);
        assert_eq!(result.actual_output, "");
        assert_eq!(
            result.error.as_deref(),
            Some("Execution timeout (2s limit exceeded)")
        );
    }

    #[test]
    fn test_timeout_message_uses_configured_limit() {
        assert_eq!(
            timeout_message(&Duration::from_millis(500)),
            "Execution timeout (0.5s limit exceeded)"
        );
    }
}
