use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::command::CommandSpec;

/// Top-level JSON configuration for one observation run.
#[derive(Debug, Clone, Deserialize)]
pub struct VigilConfig {
    /// The workload under test; its completion bounds the observation window.
    #[serde(rename = "while")]
    pub while_commands: Vec<CommandLine>,
    pub cf: PlatformConfig,
    pub allowed_failures: AllowedFailures,
    /// Directory containing the prebuilt sample application to push.
    #[serde(default = "default_app_path")]
    pub app_path: PathBuf,
    /// Start command for the pushed application.
    #[serde(default = "default_app_command")]
    pub app_command: String,
}

fn default_app_path() -> PathBuf {
    PathBuf::from("./app")
}

fn default_app_command() -> String {
    "./app".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandLine {
    pub command: String,
    #[serde(default)]
    pub command_args: Vec<String>,
}

impl CommandLine {
    pub fn to_spec(&self) -> CommandSpec {
        CommandSpec::new(&self.command).args(self.command_args.iter().cloned())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    pub api: String,
    pub app_domain: String,
    pub admin_user: String,
    pub admin_password: String,
}

/// Per-probe failure tolerance, compared at window end only.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AllowedFailures {
    pub app_pushability: usize,
    pub http_availability: usize,
    pub recent_logs: usize,
    pub streaming_logs: usize,
}

impl VigilConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }
}
