// ABOUTME: Configuration loading for the aab CLI
// ABOUTME: TOML config under ~/.config/aab with defaults for every field

use std::path::{Path, PathBuf};
use std::time::Duration;

use aab_client::Parameters;
use aab_grpc::{ChannelConfig, RetryPolicy, DEFAULT_SERVER, MAX_CONNECT_ATTEMPTS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Middleware connection settings
    pub server: ServerConfig,
    /// Generation parameters pushed by `aab params`
    pub parameters: Parameters,
    /// Inputs for the example scenarios
    pub scenarios: ScenarioConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Middleware address (host:port or URL)
    pub address: String,
    /// Name sent with the liveness handshake and chat requests
    pub client_name: String,
    /// Connection attempts before giving up
    pub connect_attempts: usize,
    /// Seconds to wait between connection attempts
    pub retry_delay_secs: u64,
    /// Seconds to wait for the channel to become ready
    pub ready_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER.to_string(),
            client_name: aab_client::DEFAULT_CLIENT_NAME.to_string(),
            connect_attempts: MAX_CONNECT_ATTEMPTS,
            retry_delay_secs: 5,
            ready_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub chat_prompt: String,
    /// Documents uploaded for the knowledge-base scenario
    pub knowledge_files: Vec<PathBuf>,
    pub knowledge_prompt: String,
    /// Images attached to the image-query scenario
    pub image_files: Vec<PathBuf>,
    pub image_prompt: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            chat_prompt: "Who are you".to_string(),
            knowledge_files: vec![PathBuf::from("resources/Minimum Wages Order 2022.pdf")],
            knowledge_prompt: "What is the minimum wages order for 2022 in Malaysia?".to_string(),
            image_files: vec![PathBuf::from("resources/image.jpg")],
            image_prompt: "Describe the images".to_string(),
        }
    }
}

impl Config {
    /// Get the XDG config directory for aab (~/.config/aab)
    pub fn config_dir() -> PathBuf {
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|p| p.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join("aab")
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load config from the XDG config directory, or defaults when absent
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Ok(config)
    }

    /// Channel settings derived from `[server]`
    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig::new(self.server.address.clone())
            .with_ready_timeout(Duration::from_secs(self.server.ready_timeout_secs))
    }

    /// Connect retry policy derived from `[server]`
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.server.connect_attempts)
            .with_delay(Duration::from_secs(self.server.retry_delay_secs))
    }

    /// Generate a default config file content
    pub fn default_toml() -> String {
        format!(
            r#"# aab configuration
# Location: ~/.config/aab/config.toml

[server]
address = "{DEFAULT_SERVER}"
# client_name = "AAB Rust Client"
# connect_attempts = 5
# retry_delay_secs = 5
# ready_timeout_secs = 15

[parameters]
# max_token = 1024
# temperature = 1.0
# retriever_top_k = 13
# reranker_top_k = 4
# reranker_threshold = 0.0
# max_num_references = 2
# reference_threshold = 0.1
# input_prompt_safety_threshold = 0.75
# streaming_batch_size = 1

[scenarios]
# chat_prompt = "Who are you"
# knowledge_files = ["resources/Minimum Wages Order 2022.pdf"]
# knowledge_prompt = "What is the minimum wages order for 2022 in Malaysia?"
# image_files = ["resources/image.jpg"]
# image_prompt = "Describe the images"
"#
        )
    }

    /// Create the config directory and a default config if none exists
    pub fn init() -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_path();

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_toml())
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Ok(config_path)
    }
}
