use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{llm, server};
use crate::error::AnalystError;

#[derive(Clone, Debug, Deserialize)]
pub struct AnalystConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Explicit secrets file; `None` means discover `.env` from the working directory
    #[serde(default)]
    pub secrets_file: Option<PathBuf>,
}

fn default_model() -> String {
    llm::DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    llm::GROQ_API_BASE.to_string()
}

fn default_temperature() -> f32 {
    llm::TEMPERATURE
}

fn default_max_tokens() -> u32 {
    llm::MAX_TOKENS
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            secrets_file: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    server::DEFAULT_BIND_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analyst: AnalystConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Loads `config.yaml` from the working directory, or defaults when absent.
    pub fn load() -> Result<Self, AnalystError> {
        Self::load_from(server::CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, AnalystError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("ℹ️ {} not found - using default configuration", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, AnalystError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: AppConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }
}
