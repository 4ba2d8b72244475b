//! Bot configuration
//!
//! Tunables load from TOML at startup and fall back to defaults if no config
//! file exists. Secrets never live in the file; they come from the process
//! environment and are required before anything is served.

use runcoach_agent::ExtractorConfig;
use runcoach_core::{Error, Result};
use runcoach_journal::journal::DEFAULT_JOURNAL_FILE;
use runcoach_llm::DEFAULT_MODEL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const ORACLE_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_CONFIG_FILE: &str = "runcoach.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuncoachConfig {
    pub bot: BotConfig,
    pub oracle: OracleConfig,
    pub journal: JournalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Mention that addresses the bot in group chats.
    pub username: String,
    /// Long-poll timeout for getUpdates, in seconds.
    pub poll_timeout_secs: u64,
    /// Telegram Bot API base URL.
    pub api_base_url: String,
    /// Serve GET /health on this port when set.
    pub health_port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound on one classification call, in seconds.
    pub timeout_secs: u64,
    /// Messages endpoint override (proxies, tests). Unset = Anthropic.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub path: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            username: "@rrunning_coach_bot".into(),
            poll_timeout_secs: 3,
            api_base_url: "https://api.telegram.org".into(),
            health_port: None,
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            max_tokens: 1024,
            timeout_secs: 30,
            base_url: None,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_JOURNAL_FILE) }
    }
}

impl RuncoachConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Apply `ANTHROPIC_API_URL` and `RUNCOACH_MODEL` from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(api_url) = std::env::var("ANTHROPIC_API_URL") {
            self.oracle.base_url = Some(format!("{}/v1/messages", api_url.trim_end_matches('/')));
        }
        if let Ok(model) = std::env::var("RUNCOACH_MODEL") {
            if !model.trim().is_empty() {
                self.oracle.model = model;
            }
        }
        self
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            model: self.oracle.model.clone(),
            max_tokens: self.oracle.max_tokens,
            timeout: Duration::from_secs(self.oracle.timeout_secs),
        }
    }
}

/// Credentials for the two external services.
#[derive(Clone)]
pub struct Secrets {
    pub telegram_bot_token: String,
    pub oracle_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_bot_token", &"<redacted>")
            .field("oracle_api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Both secrets from the environment; either one missing is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            telegram_bot_token: require(&lookup, TELEGRAM_TOKEN_VAR)?,
            oracle_api_key: require(&lookup, ORACLE_KEY_VAR)?,
        })
    }
}

/// Just the oracle key, for commands that never talk to Telegram.
pub fn oracle_key_from_env() -> Result<String> {
    require(&|name: &str| std::env::var(name).ok(), ORACLE_KEY_VAR)
}

fn require(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::missing_secret(name)),
    }
}
