//! Directory configuration.
//!
//! ```toml
//! [redis]
//! host = "127.0.0.1"
//! port = 6379
//! username = ""
//! password = ""
//! ssl = false
//! timeout-ms = 4000
//!
//! [keys]
//! nick-prefix = "networknick:nick:"
//! prior-prefix = "networknick:prior:"
//! channel = "networknick:updates"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Fixed delay before re-subscribing after a channel fault.
pub const DEFAULT_RECONNECT_BACKOFF_MS: u64 = 2000;

pub const DEFAULT_TIMEOUT_MS: u64 = 4000;

/// Where the shared store lives and how to authenticate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub ssl: bool,
    pub timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            username: String::new(),
            password: String::new(),
            ssl: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ConnectionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

// Credentials never reach the logs.
impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field(
                "password",
                &if self.password.is_empty() { "" } else { "<redacted>" },
            )
            .field("ssl", &self.ssl)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Key prefixes and broadcast channel name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct KeyLayout {
    pub nick_prefix: String,
    pub prior_prefix: String,
    pub channel: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            nick_prefix: "networknick:nick:".to_string(),
            prior_prefix: "networknick:prior:".to_string(),
            channel: "networknick:updates".to_string(),
        }
    }
}

/// Everything a `NicknameDirectory` needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub connection: ConnectionSettings,
    pub keys: KeyLayout,
    pub reconnect_backoff: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings::default(),
            keys: KeyLayout::default(),
            reconnect_backoff: Duration::from_millis(DEFAULT_RECONNECT_BACKOFF_MS),
        }
    }
}
