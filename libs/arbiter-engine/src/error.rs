//! Request-level error taxonomy.
//!
//! Case-level failures (runtime errors, timeouts) are never represented here:
//! they live inside the case's `ExecutionResult`.

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::engine::format_limit;

/// Pre-flight rejection, raised before any process is spawned
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("code cannot be empty")]
    EmptySource,
    #[error("code must contain a main function")]
    MissingEntryPoint,
    #[error("code exceeds maximum size of {limit} bytes ({size} bytes submitted)")]
    SourceTooLarge { size: usize, limit: usize },
    #[error("test case {case_number} input exceeds maximum size of {limit} bytes ({size} bytes)")]
    InputTooLarge {
        case_number: usize,
        size: usize,
        limit: usize,
    },
}

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create work directory {path}: {source}")]
    WorkDir { path: String, source: io::Error },
    #[error("failed to write source file: {0}")]
    WriteSource(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum CompileError {
    /// Compiler ran and rejected the source; `message` is its raw output
    #[error("compilation failed: {message}")]
    Failed { message: String },
    #[error("compilation timeout ({} limit exceeded)", format_limit(.limit))]
    Timeout { limit: Duration },
    #[error("failed to start compiler: {0}")]
    Spawn(#[source] io::Error),
}

/// Anything that aborts a whole request
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl EngineError {
    /// Short machine-readable category for wire replies
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation",
            EngineError::Staging(_) => "staging",
            EngineError::Compile(_) => "compile",
        }
    }
}
