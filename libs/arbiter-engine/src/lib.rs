//! Arbiter engine: compile untrusted source once, run it against ordered
//! test cases under a wall-clock limit, and report a verdict per case.

pub mod compiler;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod runner;
pub mod staging;
pub mod validator;

mod process;

#[cfg(test)]
mod testutil;

pub use engine::{RunLimits, RunOutcome, RunOutput, SandboxPolicy, TimeoutSandbox};
pub use error::{CompileError, EngineError, StagingError, ValidationError};
pub use executor::Executor;
