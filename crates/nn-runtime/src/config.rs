//! # Runtime Configuration
//!
//! One TOML file, every section optional:
//!
//! ```toml
//! [redis]
//! host = "127.0.0.1"
//! port = 6379
//! password = ""
//!
//! [nick]
//! max-length = 16
//!
//! [hide]
//! random-length = 12
//!
//! [enforce]
//! period-ticks = 10
//! max-runs = 6
//!
//! [subscription]
//! backoff-ms = 2000
//! ```
//!
//! Environment variables override the file: `NN_REDIS_HOST`, `NN_REDIS_PORT`,
//! `NN_REDIS_USERNAME`, `NN_REDIS_PASSWORD`, `NN_REDIS_SSL`. `NN_CONFIG`
//! selects the file. Out-of-range numbers are clamped, never rejected.

use nn_01_text_codec::{clamp_max_visible_len, DEFAULT_MAX_VISIBLE_LEN};
use nn_02_directory::config::DEFAULT_RECONNECT_BACKOFF_MS;
use nn_02_directory::{ConnectionSettings, DirectoryConfig, KeyLayout};
use nn_03_presence::{ApplyConfig, EnforceConfig};
use nn_04_hide::HideConfig;
use nn_05_commands::{CommandSettings, MessageCatalog, PermissionNodes};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "networknick.toml";

const MIN_BACKOFF_MS: u64 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NickSection {
    pub max_length: i64,
}

impl Default for NickSection {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_VISIBLE_LEN as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SubscriptionSection {
    pub backoff_ms: u64,
}

impl Default for SubscriptionSection {
    fn default() -> Self {
        Self {
            backoff_ms: DEFAULT_RECONNECT_BACKOFF_MS,
        }
    }
}

/// Complete process configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NickConfig {
    pub redis: ConnectionSettings,
    pub keys: KeyLayout,
    pub nick: NickSection,
    pub hide: HideConfig,
    pub apply: ApplyConfig,
    pub enforce: EnforceConfig,
    pub subscription: SubscriptionSection,
    pub permissions: PermissionNodes,
    pub messages: MessageCatalog,
}

impl NickConfig {
    /// Parse, then clamp. No environment overrides.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config.normalized())
    }

    /// Load `path` (defaults when missing), then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                info!(path = %path.display(), "Loaded configuration");
                Self::parse(&content)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config.normalized())
    }

    /// Override connection settings from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("NN_REDIS_HOST").filter(|h| !h.trim().is_empty()) {
            self.redis.host = host.trim().to_string();
        }
        if let Some(port) = lookup("NN_REDIS_PORT") {
            match port.trim().parse() {
                Ok(p) => self.redis.port = p,
                Err(_) => warn!(value = %port, "NN_REDIS_PORT is not a port number, ignored"),
            }
        }
        if let Some(username) = lookup("NN_REDIS_USERNAME") {
            self.redis.username = username;
        }
        if let Some(password) = lookup("NN_REDIS_PASSWORD") {
            self.redis.password = password;
        }
        if let Some(ssl) = lookup("NN_REDIS_SSL") {
            self.redis.ssl = matches!(ssl.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// Clamp numeric settings into range.
    pub fn normalized(mut self) -> Self {
        self.nick.max_length = clamp_max_visible_len(self.nick.max_length) as i64;
        self.enforce = self.enforce.normalized();
        self.subscription.backoff_ms = self.subscription.backoff_ms.max(MIN_BACKOFF_MS);
        self
    }

    pub fn max_visible_len(&self) -> usize {
        clamp_max_visible_len(self.nick.max_length)
    }

    pub fn directory_config(&self) -> DirectoryConfig {
        DirectoryConfig {
            connection: self.redis.clone(),
            keys: self.keys.clone(),
            reconnect_backoff: Duration::from_millis(self.subscription.backoff_ms),
        }
    }

    pub fn command_settings(&self) -> CommandSettings {
        CommandSettings::new(
            self.permissions.clone(),
            self.messages.clone(),
            self.max_visible_len(),
        )
    }
}

/// `NN_CONFIG`, else `networknick.toml` in the working directory.
pub fn config_path() -> PathBuf {
    std::env::var("NN_CONFIG")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
