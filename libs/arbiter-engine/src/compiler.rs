// Compilation of a staged source into its reserved binary path

use crate::error::CompileError;
use crate::process::{run_with_deadline, Completion, DEFAULT_CAPTURE_LIMIT};
use crate::staging::StagedArtifact;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// External native compiler invoked as `<compiler> <flags..> <source> -o <binary>`
#[derive(Debug, Clone)]
pub struct Compiler {
    program: String,
    flags: Vec<String>,
    timeout: Duration,
}

impl Compiler {
    pub fn new(program: impl Into<String>, flags: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            flags,
            timeout,
        }
    }

    fn command(&self, artifact: &StagedArtifact) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.flags)
            .arg(artifact.source_path())
            .arg("-o")
            .arg(artifact.binary_path());
        cmd
    }

    /// Compile once. On success the binary at `artifact.binary_path()` exists.
    ///
    /// A non-zero exit yields `CompileError::Failed` carrying the compiler's
    /// stdout followed by its stderr, verbatim.
    #[instrument(skip(self, artifact), fields(execution_id = %artifact.id(), compiler = %self.program))]
    pub async fn compile(&self, artifact: &StagedArtifact) -> Result<(), CompileError> {
        let mut cmd = self.command(artifact);
        let (completion, elapsed) = run_with_deadline(&mut cmd, None, self.timeout, DEFAULT_CAPTURE_LIMIT)
            .await
            .map_err(CompileError::Spawn)?;

        let compile_time_ms = elapsed.as_millis() as u64;

        match completion {
            Completion::TimedOut => {
                warn!(compile_time_ms, "Compilation timed out");
                Err(CompileError::Timeout { limit: self.timeout })
            }
            Completion::Exited { status, stdout, stderr } if status.success() => {
                if !artifact.binary_path().exists() {
                    warn!(compile_time_ms, "Compiler succeeded but produced no binary");
                    return Err(CompileError::Failed {
                        message: format!(
                            "compiler exited successfully but produced no binary{}",
                            combined_output(&stdout, &stderr)
                                .map(|out| format!(":\n{}", out))
                                .unwrap_or_default()
                        ),
                    });
                }
                info!(compile_time_ms, "Compilation succeeded");
                Ok(())
            }
            Completion::Exited { status, stdout, stderr } => {
                let message = combined_output(&stdout, &stderr).unwrap_or_default();
                warn!(
                    compile_time_ms,
                    exit_code = ?status.code(),
                    error_preview = message.lines().next().unwrap_or(""),
                    "Compilation failed"
                );
                Err(CompileError::Failed { message })
            }
        }
    }
}

fn combined_output(stdout: &[u8], stderr: &[u8]) -> Option<String> {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(stderr));
    (!combined.is_empty()).then_some(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::stage;
    use crate::testutil::{fake_compiler, install_script};

    fn compiler(program: &std::path::Path, timeout: Duration) -> Compiler {
        Compiler::new(program.display().to_string(), vec!["-O3".to_string()], timeout)
    }

    #[test]
    fn test_combined_output_order() {
        assert_eq!(combined_output(b"warn\n", b"error\n"), Some("warn\nerror\n".to_string()));
        assert_eq!(combined_output(b"", b""), None);
    }

    #[tokio::test]
    async fn test_compile_success_produces_binary() {
        let tools = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let cc = fake_compiler(tools.path());

        let artifact = stage(work.path(), "#!/bin/sh\n# int main\necho hi\n", "cpp")
            .await
            .unwrap();
        compiler(&cc, Duration::from_secs(10)).compile(&artifact).await.unwrap();

        assert!(artifact.binary_path().exists());
    }

    #[tokio::test]
    async fn test_compile_failure_returns_diagnostics() {
        let tools = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let cc = fake_compiler(tools.path());

        let artifact = stage(work.path(), "int main() { syntax error }", "cpp")
            .await
            .unwrap();
        let err = compiler(&cc, Duration::from_secs(10))
            .compile(&artifact)
            .await
            .unwrap_err();

        match err {
            CompileError::Failed { message } => {
                assert!(message.contains("error: expected ';'"), "got: {}", message);
                assert!(message.contains("note: compiling"), "stdout missing: {}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!artifact.binary_path().exists());
    }

    #[tokio::test]
    async fn test_compile_timeout() {
        let tools = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let cc = fake_compiler(tools.path());

        let artifact = stage(work.path(), "int main() { slow compile }", "cpp")
            .await
            .unwrap();
        let err = compiler(&cc, Duration::from_millis(300))
            .compile(&artifact)
            .await
            .unwrap_err();

        assert!(matches!(err, CompileError::Timeout { limit } if limit == Duration::from_millis(300)));
    }

    #[tokio::test]
    async fn test_missing_compiler_is_spawn_error() {
        let work = tempfile::tempdir().unwrap();
        let artifact = stage(work.path(), "int main() {}", "cpp").await.unwrap();

        let err = compiler(std::path::Path::new("/nonexistent/g++"), Duration::from_secs(1))
            .compile(&artifact)
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::Spawn(_)));
    }

    #[tokio::test]
    async fn test_success_without_binary_is_failure() {
        let tools = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let cc = install_script(tools.path(), "noop-cc", "#!/bin/sh\nexit 0\n");

        let artifact = stage(work.path(), "int main() {}", "cpp").await.unwrap();
        let err = compiler(&cc, Duration::from_secs(5))
            .compile(&artifact)
            .await
            .unwrap_err();

        assert!(matches!(err, CompileError::Failed { message } if message.contains("produced no binary")));
    }

    #[tokio::test]
    #[ignore] // Requires g++ on PATH
    async fn test_real_gxx_compiles() {
        let work = tempfile::tempdir().unwrap();
        let artifact = stage(
            work.path(),
            "#include <iostream>\nint main() { std::cout << 4; }\n",
            "cpp",
        )
        .await
        .unwrap();

        Compiler::new("g++", vec!["-O3".to_string()], Duration::from_secs(10))
            .compile(&artifact)
            .await
            .unwrap();
        assert!(artifact.binary_path().exists());
    }
}
