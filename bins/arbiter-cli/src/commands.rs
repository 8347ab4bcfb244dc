// CLI commands for Arbiter
use anyhow::{bail, Context, Result};
use arbiter_common::cases::{assemble_cases, Problem};
use arbiter_common::config::{EngineConfig, DEFAULT_CONFIG_PATH};
use arbiter_common::types::{ExecutionRequest, ExecutionSummary, Mode, TestCase};
use arbiter_engine::{EngineError, Executor};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

fn load_config(config_path: Option<&Path>) -> Result<EngineConfig> {
    match config_path {
        Some(path) => {
            let mut config = EngineConfig::load(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => EngineConfig::load_with_env(Path::new(DEFAULT_CONFIG_PATH)),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Build the request the engine will see from the CLI inputs
fn build_request(
    source: String,
    problem: Option<Problem>,
    custom_cases: &[TestCase],
    mode: Mode,
) -> ExecutionRequest {
    let problem = problem.unwrap_or_else(Problem::playground);
    ExecutionRequest {
        source,
        test_cases: assemble_cases(&problem, mode, custom_cases),
        mode,
    }
}

/// Compile and judge a source file. Returns whether every case passed.
pub async fn run(
    config_path: Option<&Path>,
    source_path: &Path,
    problem_path: Option<&Path>,
    custom_path: Option<&Path>,
    mode: Mode,
    json: bool,
) -> Result<bool> {
    let config = load_config(config_path)?;
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("Failed to read {}", source_path.display()))?;

    let problem = problem_path.map(read_json::<Problem>).transpose()?;
    let custom_cases: Vec<TestCase> = custom_path
        .map(read_json::<Vec<TestCase>>)
        .transpose()?
        .unwrap_or_default();

    let request = build_request(source, problem, &custom_cases, mode);
    debug!(mode = %mode, test_count = request.test_cases.len(), "Assembled test cases");
    if request.test_cases.is_empty() {
        bail!("No test cases to run (mode: {})", mode);
    }

    let executor = Executor::new(config);
    let summary = match executor.execute_request(&request).await {
        Ok(summary) => summary,
        Err(EngineError::Compile(e)) => {
            eprintln!("✗ Compilation failed\n");
            bail!("{}", e);
        }
        Err(e) => bail!("{}", e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(summary.success)
}

fn print_summary(summary: &ExecutionSummary) {
    for result in &summary.results {
        if result.passed {
            println!("  Case {} ✓ passed", result.case_number);
            continue;
        }

        println!("  Case {} ✗ failed", result.case_number);
        match &result.error {
            Some(error) => println!("    {}", error.trim_end()),
            None => {
                println!("    Expected: \"{}\"", result.expected_output.trim());
                println!("    Got:      \"{}\"", result.actual_output);
            }
        }
    }

    println!();
    println!("→ {} / {} passed", summary.total_passed, summary.total_cases);
}

/// Pre-flight checks only; nothing is written or spawned
pub fn validate(config_path: Option<&Path>, source_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("Failed to read {}", source_path.display()))?;

    Executor::new(config).validate(&source)?;
    println!("✅ {} looks valid", source_path.display());
    Ok(())
}

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    EngineConfig::default().save(path)?;
    println!("📝 Wrote default engine config to {}", path.display());
    Ok(())
}
