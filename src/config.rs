use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::extract::DEFAULT_PROMPT_FUNCTION;
use crate::session::state::{DEFAULT_PLACEHOLDER_PROMPT, SessionOptions};

const CONFIG_PATH: &str = ".promptrun/config.toml";

/// Project-level configuration from `.promptrun/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub extract: ExtractConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// Remote execution service over HTTP.
    #[default]
    Http,
    /// Local interpreter subprocess.
    Process,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub kind: GatewayKind,
    /// Base URL of the execution service.
    pub url: String,
    /// Upper bound on one execution, in seconds.
    pub timeout_secs: u64,
    /// Interpreter used by the process gateway.
    pub interpreter: String,
    pub interpreter_args: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::default(),
            url: "http://localhost:5000".to_string(),
            timeout_secs: 15,
            interpreter: "python3".to_string(),
            interpreter_args: vec!["-u".to_string()],
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Name of the input-request function whose literal argument is a prompt.
    pub function: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            function: DEFAULT_PROMPT_FUNCTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Label for the input line when no prompt is pending.
    pub placeholder_prompt: String,
    /// File name used when saving the source without an explicit path.
    pub download_name: String,
    /// Where persisted sources live. Defaults to the platform data dir.
    pub store_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            placeholder_prompt: DEFAULT_PLACEHOLDER_PROMPT.to_string(),
            download_name: "code.py".to_string(),
            store_dir: None,
        }
    }
}

impl Config {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            prompt_function: self.extract.function.clone(),
            placeholder_prompt: self.session.placeholder_prompt.clone(),
        }
    }
}

/// Load configuration from `.promptrun/config.toml` under `dir`.
///
/// Falls back to defaults if the file is missing.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_from(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(config)
}
