//! Homework bot configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Main bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Log file path, defaults to the user data directory
    #[serde(rename = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Homework status API
    pub api: ApiConfig,

    /// Telegram bot delivery
    pub telegram: TelegramConfig,

    /// Poll loop cadence
    pub poll: PollConfig,
}

impl Config {
    /// Validate values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        // A zero interval would poll the API back to back
        if self.poll.retry_interval_secs == 0 {
            return Err(eyre::eyre!("poll.retry-interval-secs must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: ./homework-bot.yml
        let local_config = PathBuf::from("homework-bot.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/homework-bot/homework-bot.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("homework-bot").join("homework-bot.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Resolved log file location
    pub fn log_file_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("homework-bot")
                .join("logs")
                .join("homework-bot.log")
        })
    }
}

/// Homework status API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Status endpoint URL
    pub endpoint: String,

    /// Environment variable containing the OAuth token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string(),
            token_env: "PRACTICUM_TOKEN".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Telegram bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Environment variable containing the bot token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// Environment variable containing the target chat id
    #[serde(rename = "chat-id-env")]
    pub chat_id_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.telegram.org".to_string(),
            token_env: "TELEGRAM_TOKEN".to_string(),
            chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl TelegramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between cycles
    #[serde(rename = "retry-interval-secs")]
    pub retry_interval_secs: u64,

    /// Starting `from_date`; defaults to the time the bot starts
    #[serde(rename = "from-date")]
    pub from_date: Option<i64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: 600,
            from_date: None,
        }
    }
}

impl PollConfig {
    /// Get the retry interval as a Duration
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

/// The three secrets the bot cannot start without
#[derive(Clone, PartialEq, Eq)]
pub struct Secrets {
    pub api_token: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_token", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment
    pub fn from_env(config: &Config) -> Result<Self, ConfigError> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve secrets through `lookup`, reporting every missing one at once
    ///
    /// Empty values count as missing.
    pub fn resolve<F>(config: &Config, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut get = |name: &str| match lookup(name).filter(|v| !v.trim().is_empty()) {
            Some(value) => value,
            None => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let api_token = get(config.api.token_env.as_str());
        let bot_token = get(config.telegram.token_env.as_str());
        let chat_id = get(config.telegram.chat_id_env.as_str());

        if !missing.is_empty() {
            return Err(ConfigError::MissingConfiguration { missing });
        }

        Ok(Self {
            api_token,
            bot_token,
            chat_id,
        })
    }
}
