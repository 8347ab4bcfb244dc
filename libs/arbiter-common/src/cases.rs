// Case-set assembly for run/submit modes

use crate::types::{Mode, TestCase};
use serde::{Deserialize, Serialize};

/// The test data a problem carries. Hidden cases are only run on submit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sample_cases: Vec<TestCase>,
    #[serde(default)]
    pub hidden_cases: Vec<TestCase>,
}

impl Problem {
    /// Scratchpad problem with no cases of its own; `run` executes custom cases only.
    pub fn playground() -> Self {
        Self {
            title: "Playground".to_string(),
            ..Default::default()
        }
    }
}

/// Build the ordered case list the engine will run.
///
/// - `Submit`: samples then hidden cases; custom cases are ignored
/// - `Run`: samples then custom cases
pub fn assemble_cases(problem: &Problem, mode: Mode, custom_cases: &[TestCase]) -> Vec<TestCase> {
    let mut cases = problem.sample_cases.clone();
    match mode {
        Mode::Submit => cases.extend(problem.hidden_cases.iter().cloned()),
        Mode::Run => cases.extend(custom_cases.iter().cloned()),
    }
    cases
}
