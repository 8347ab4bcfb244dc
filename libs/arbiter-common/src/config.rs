// Engine configuration for Arbiter
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/engine.json";

pub const ENV_COMPILER: &str = "ARBITER_COMPILER";
pub const ENV_COMPILE_TIMEOUT_MS: &str = "ARBITER_COMPILE_TIMEOUT_MS";
pub const ENV_EXEC_TIMEOUT_MS: &str = "ARBITER_EXEC_TIMEOUT_MS";
pub const ENV_WORK_DIR: &str = "ARBITER_WORK_DIR";

/// Everything the engine needs to know, passed in at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub compiler: String,
    pub compiler_flags: Vec<String>,
    pub compile_timeout_ms: u64,
    pub execution_timeout_ms: u64,
    pub work_dir: PathBuf,
    pub source_extension: String,
    pub entry_point_marker: String,
    pub max_source_bytes: usize,
    pub max_input_bytes: usize,
    /// Captured bytes kept per output stream of a test run
    pub max_output_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            compiler_flags: vec!["-O3".to_string()],
            compile_timeout_ms: 10_000,
            execution_timeout_ms: 2_000,
            work_dir: std::env::temp_dir(),
            source_extension: "cpp".to_string(),
            entry_point_marker: "int main".to_string(),
            max_source_bytes: 1024 * 1024, // 1MB
            max_input_bytes: 10 * 1024 * 1024, // 10MB
            max_output_bytes: 8 * 1024 * 1024, // 8MB
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. Fields missing from the file keep their defaults.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Engine config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `config/engine.json` if present, otherwise defaults, then apply
    /// `ARBITER_*` environment overrides.
    pub fn load_default() -> Result<Self> {
        Self::load_with_env(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_with_env(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            Self::load(config_path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(compiler) = lookup(ENV_COMPILER) {
            self.compiler = compiler;
        }
        if let Some(raw) = lookup(ENV_COMPILE_TIMEOUT_MS) {
            self.compile_timeout_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_COMPILE_TIMEOUT_MS, raw))?;
        }
        if let Some(raw) = lookup(ENV_EXEC_TIMEOUT_MS) {
            self.execution_timeout_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {}", ENV_EXEC_TIMEOUT_MS, raw))?;
        }
        if let Some(dir) = lookup(ENV_WORK_DIR) {
            self.work_dir = PathBuf::from(dir);
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.compiler.trim().is_empty() {
            bail!("compiler cannot be empty");
        }
        if self.compile_timeout_ms == 0 {
            bail!("compile_timeout_ms must be greater than zero");
        }
        if self.execution_timeout_ms == 0 {
            bail!("execution_timeout_ms must be greater than zero");
        }
        if self.max_output_bytes == 0 {
            bail!("max_output_bytes must be greater than zero");
        }
        Ok(())
    }

    pub fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout_ms)
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_millis(self.execution_timeout_ms)
    }

    /// Write this configuration as pretty JSON, creating parent directories.
    pub fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json_content =
            serde_json::to_string_pretty(self).context("Failed to serialize engine config")?;

        fs::write(config_path, json_content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        Ok(())
    }
}
