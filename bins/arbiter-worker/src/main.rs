mod worker;

use arbiter_common::config::EngineConfig;
use arbiter_engine::Executor;
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{error, info, instrument, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Arbiter worker booting...");

    let config_path = std::env::var("ARBITER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(arbiter_common::config::DEFAULT_CONFIG_PATH));

    let config = EngineConfig::load_with_env(&config_path).map_err(|e| {
        error!("Failed to load engine configuration: {:#}", e);
        e
    })?;

    info!(
        compiler = %config.compiler,
        compile_timeout_ms = config.compile_timeout_ms,
        execution_timeout_ms = config.execution_timeout_ms,
        work_dir = %config.work_dir.display(),
        "Engine configured"
    );

    let executor = Executor::new(config);

    // Setup graceful shutdown
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
        warn!("Received shutdown signal, stopping...");
    };

    tokio::select! {
        result = worker_loop(&executor) => result?,
        _ = shutdown => {},
    }

    info!("Worker shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout carries replies; logs go to stderr
    let json = std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false);
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// One JSON request per stdin line, one JSON reply per stdout line, until EOF
#[instrument(skip(executor))]
async fn worker_loop(executor: &Executor) -> anyhow::Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let start = std::time::Instant::now();
        let reply = worker::handle_line(executor, &line).await;
        info!(
            status = reply.status(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request handled"
        );

        let mut payload = serde_json::to_string(&reply)?;
        payload.push('\n');
        stdout.write_all(payload.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("Input closed");
    Ok(())
}
