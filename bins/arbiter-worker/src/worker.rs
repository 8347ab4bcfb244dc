// Request decoding and reply shaping for the line-oriented worker

use arbiter_common::types::{ExecutionRequest, ExecutionSummary};
use arbiter_engine::Executor;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reply {
    Ok {
        summary: ExecutionSummary,
    },
    Error {
        kind: &'static str,
        message: String,
    },
}

impl Reply {
    pub fn status(&self) -> &'static str {
        match self {
            Reply::Ok { .. } => "ok",
            Reply::Error { .. } => "error",
        }
    }
}

pub async fn handle_line(executor: &Executor, line: &str) -> Reply {
    let request: ExecutionRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected malformed request");
            return Reply::Error {
                kind: "request",
                message: format!("Invalid request format: {}", e),
            };
        }
    };

    match executor.execute_request(&request).await {
        Ok(summary) => Reply::Ok { summary },
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Request failed");
            Reply::Error {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_common::config::EngineConfig;

    fn executor(work: &tempfile::TempDir) -> Executor {
        Executor::new(EngineConfig {
            compiler: "/nonexistent/g++".to_string(),
            work_dir: work.path().to_path_buf(),
            ..EngineConfig::default()
        })
    }

    #[tokio::test]
    async fn test_malformed_request() {
        let work = tempfile::tempdir().unwrap();
        let reply = handle_line(&executor(&work), "{not json").await;

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "request");
    }

    #[tokio::test]
    async fn test_validation_error_reply() {
        let work = tempfile::tempdir().unwrap();
        let reply = handle_line(
            &executor(&work),
            r#"{"source":"   ","test_cases":[{"input":"1","expected_output":"1"}],"mode":"run"}"#,
        )
        .await;

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["message"], "code cannot be empty");
    }

    #[tokio::test]
    async fn test_missing_compiler_is_compile_error() {
        let work = tempfile::tempdir().unwrap();
        let reply = handle_line(
            &executor(&work),
            r#"{"source":"int main() { return 0; }","test_cases":[]}"#,
        )
        .await;

        assert_eq!(reply.status(), "error");
        assert!(matches!(reply, Reply::Error { kind: "compile", .. }));
    }

    #[test]
    fn test_ok_reply_shape() {
        let reply = Reply::Ok {
            summary: ExecutionSummary::from_results(Vec::new()),
        };
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["summary"]["success"], true);
        assert_eq!(json["summary"]["total_cases"], 0);
    }
}
