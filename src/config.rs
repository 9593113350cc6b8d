use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Animo";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name used in templates when the participant has no usable name.
pub const DEFAULT_PARTICIPANT_NAME: &str = "amigo";

/// Bounds of the simulated "thinking" pause before an assistant reply.
pub const THINKING_DELAY_MIN_MS: u64 = 1200;
pub const THINKING_DELAY_MAX_MS: u64 = 3500;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Environment overrides read by `ServerConfig::from_env`.
pub const ENV_BIND_ADDR: &str = "ANIMO_BIND_ADDR";
pub const ENV_DB_PATH: &str = "ANIMO_DB_PATH";

/// Get the application data directory.
/// Falls back to the working directory when the platform has no data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("animo")
}

/// Default location of the conversation database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("conversations.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "animo=info,tower_http=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid bind address {value}: {reason}")]
    InvalidBindAddr { value: String, reason: String },

    #[error("Invalid database path: {0}")]
    InvalidDatabasePath(String),
}

/// Settings for the HTTP surface.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
}

impl ServerConfig {
    /// Build from environment overrides, falling back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddr {
                value: raw_addr.clone(),
                reason: e.to_string(),
            })?;

        let database_path = match lookup(ENV_DB_PATH) {
            Some(p) if p.trim().is_empty() => {
                return Err(ConfigError::InvalidDatabasePath("empty path".into()))
            }
            Some(p) => PathBuf::from(p),
            None => database_path(),
        };

        Ok(Self {
            bind_addr,
            database_path,
        })
    }
}

/// Simulated pause before an assistant reply is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingDelay {
    pub min: Duration,
    pub max: Duration,
}

impl ThinkingDelay {
    /// No pause at all. Used by tests and non-interactive callers.
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn is_none(&self) -> bool {
        self.max.is_zero()
    }
}

impl Default for ThinkingDelay {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(THINKING_DELAY_MIN_MS),
            max: Duration::from_millis(THINKING_DELAY_MAX_MS),
        }
    }
}

/// Per-session chat settings.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub thinking_delay: ThinkingDelay,
    pub fallback_name: String,
}

impl ChatConfig {
    /// Same as the default but without the thinking pause.
    pub fn immediate() -> Self {
        Self {
            thinking_delay: ThinkingDelay::none(),
            ..Self::default()
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            thinking_delay: ThinkingDelay::default(),
            fallback_name: DEFAULT_PARTICIPANT_NAME.to_string(),
        }
    }
}
