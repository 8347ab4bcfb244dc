mod commands;

use anyhow::Result;
use arbiter_common::types::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arbiter-cli")]
#[command(about = "Arbiter CLI - Compile and judge programs against test cases", long_about = None)]
struct Cli {
    /// Engine config file (defaults to config/engine.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file and run it against a problem's cases
    Run {
        /// Source file to compile
        #[arg(short, long)]
        source: PathBuf,

        /// Problem JSON with sample_cases/hidden_cases (omit for playground)
        #[arg(short, long)]
        problem: Option<PathBuf>,

        /// JSON array of custom test cases (used in run mode)
        #[arg(short, long)]
        custom: Option<PathBuf>,

        /// run: samples + custom, submit: samples + hidden
        #[arg(short, long, default_value = "run", value_parser = parse_mode)]
        mode: Mode,

        /// Print the summary as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Run the pre-flight checks on a source file without compiling it
    Validate {
        #[arg(short, long)]
        source: PathBuf,
    },

    /// Write a default engine configuration file
    InitConfig {
        #[arg(short, long, default_value = arbiter_common::config::DEFAULT_CONFIG_PATH)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str(s).ok_or_else(|| format!("invalid mode '{}' (expected run or submit)", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            problem,
            custom,
            mode,
            json,
        } => {
            let passed = commands::run(
                cli.config.as_deref(),
                &source,
                problem.as_deref(),
                custom.as_deref(),
                mode,
                json,
            )
            .await?;
            if !passed {
                std::process::exit(1);
            }
        }
        Commands::Validate { source } => {
            commands::validate(cli.config.as_deref(), &source)?;
        }
        Commands::InitConfig { path, force } => {
            commands::init_config(&path, force)?;
        }
    }

    Ok(())
}
