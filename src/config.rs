//! Configuration management for echoverse.
//!
//! Loads config from YAML files in standard locations. Every section has
//! defaults, so an empty or missing file yields a working local setup.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8501,
        }
    }
}

/// Which text-generation back-end rewrites the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriterBackend {
    Ollama,
    Hosted,
    Disabled,
}

impl std::fmt::Display for RewriterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Hosted => write!(f, "hosted"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    pub backend: RewriterBackend,
    /// Model name for the Ollama back-end.
    pub model: String,
    /// Ollama base URL.
    pub host: String,
    /// Full model URL for the hosted inference back-end.
    pub hosted_url: String,
    /// Environment variable holding the hosted API token.
    pub api_token_env: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_new_tokens: u32,
    pub timeout_secs: u64,
    pub loading_retry_delay_secs: u64,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            backend: RewriterBackend::Ollama,
            model: "granite3.1-moe:3b".into(),
            host: "http://localhost:11434".into(),
            hosted_url:
                "https://api-inference.huggingface.co/models/ibm-granite/granite-3.1-3b-a800m-instruct"
                    .into(),
            api_token_env: "HF_API_TOKEN".into(),
            temperature: 0.7,
            top_p: 0.9,
            max_new_tokens: 200,
            timeout_secs: 60,
            loading_retry_delay_secs: 20,
        }
    }
}

impl RewriterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn loading_retry_delay(&self) -> Duration {
        Duration::from_secs(self.loading_retry_delay_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    /// OpenAI-compatible speech endpoint, e.g. an Edge TTS bridge.
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the TTS API key (optional).
    pub api_key_env: String,
    pub output_dir: PathBuf,
    pub response_format: String,
    pub timeout_secs: u64,
    pub loading_retry_delay_secs: u64,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5050/v1/audio/speech".into(),
            model: "tts-1".into(),
            api_key_env: "TTS_API_KEY".into(),
            output_dir: PathBuf::from("narrations"),
            response_format: "mp3".into(),
            timeout_secs: 120,
            loading_retry_delay_secs: 10,
        }
    }
}

impl NarratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn loading_retry_delay(&self) -> Duration {
        Duration::from_secs(self.loading_retry_delay_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub rewriter: RewriterConfig,
    pub narrator: NarratorConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/echoverse/config.yaml
    /// 3. /etc/echoverse/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/echoverse/config.yaml")),
                Some(PathBuf::from("/etc/echoverse/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(contents)
    }
}
