/// Request Executor - High-Level Orchestration
///
/// **Responsibility:**
/// Validate → stage → compile once → run every case in order → collect verdicts.
///
/// **Architecture:**
/// 1. Validator rejects obviously invalid source (validator.rs)
/// 2. Staging owns the source/binary files for the request (staging.rs)
/// 3. Compiler builds the binary once (compiler.rs)
/// 4. CaseRunner runs each case through the sandbox policy (runner.rs)
///
/// Request-level failures (validation, staging, compile) return a single
/// error with no per-case results. Case-level failures never abort siblings.

use crate::compiler::Compiler;
use crate::engine::{RunLimits, SandboxPolicy, TimeoutSandbox};
use crate::error::{EngineError, ValidationError};
use crate::runner::CaseRunner;
use crate::staging::stage;
use crate::validator;
use arbiter_common::config::EngineConfig;
use arbiter_common::types::{ExecutionRequest, ExecutionResult, ExecutionSummary, TestCase};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

pub struct Executor {
    config: EngineConfig,
    compiler: Compiler,
    runner: CaseRunner,
}

impl Executor {
    /// Executor with the wall-clock-only sandbox
    pub fn new(config: EngineConfig) -> Self {
        Self::with_sandbox(config, Arc::new(TimeoutSandbox))
    }

    pub fn with_sandbox(config: EngineConfig, sandbox: Arc<dyn SandboxPolicy>) -> Self {
        let compiler = Compiler::new(
            config.compiler.clone(),
            config.compiler_flags.clone(),
            config.compile_timeout(),
        );
        let limits =
            RunLimits::new(config.execution_timeout()).with_output_limit(config.max_output_bytes);
        let runner = CaseRunner::new(sandbox, limits);

        Self {
            config,
            compiler,
            runner,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn validate(&self, source: &str) -> Result<(), ValidationError> {
        validator::validate(
            source,
            &self.config.entry_point_marker,
            self.config.max_source_bytes,
        )
    }

    /// Compile `source` once and run it against every case, in order.
    ///
    /// On success the result list has one entry per case, numbered from 1.
    #[instrument(skip(self, source, test_cases), fields(test_count = test_cases.len()))]
    pub async fn execute(
        &self,
        source: &str,
        test_cases: &[TestCase],
    ) -> Result<Vec<ExecutionResult>, EngineError> {
        self.validate(source)?;
        validator::validate_inputs(test_cases, self.config.max_input_bytes)?;

        let artifact = stage(&self.config.work_dir, source, &self.config.source_extension).await?;
        info!(
            execution_id = %artifact.id(),
            source_size = source.len(),
            "Compiling submission"
        );

        self.compiler.compile(&artifact).await?;

        let start = Instant::now();
        let mut results = Vec::with_capacity(test_cases.len());
        for (idx, test_case) in test_cases.iter().enumerate() {
            let result = self
                .runner
                .run_case(artifact.binary_path(), test_case, idx + 1)
                .await;
            results.push(result);
        }

        info!(
            execution_id = %artifact.id(),
            passed = results.iter().filter(|r| r.passed).count(),
            total = results.len(),
            execution_ms = start.elapsed().as_millis() as u64,
            "All test cases executed"
        );

        Ok(results)
    }

    /// Execute a request and summarize the verdicts
    pub async fn execute_request(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionSummary, EngineError> {
        info!(mode = %request.mode, test_count = request.test_cases.len(), "Executing request");
        let results = self.execute(&request.source, &request.test_cases).await?;
        Ok(ExecutionSummary::from_results(results))
    }
}
