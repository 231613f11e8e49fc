//! Server configuration.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::games::cricket::{DEFAULT_HISTORY_CAP, DEFAULT_REPEAT_LIMIT, HardPolicy, Rules};
use crate::session::{DEFAULT_CAPACITY, DEFAULT_SESSION_TIMEOUT_SECS, SessionStore};

/// Configuration for the hand cricket server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    host: String,

    /// Port to bind to.
    port: u16,

    /// Maximum number of concurrent sessions.
    capacity: usize,

    /// Seconds of inactivity before a session may be reclaimed.
    session_timeout_secs: u64,

    /// Most picks remembered per innings.
    history_cap: usize,

    /// Consecutive identical picks that dismiss a batting player.
    repeat_limit: u32,

    /// How hard difficulty uses its prediction.
    hard_policy: HardPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            capacity: DEFAULT_CAPACITY,
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            history_cap: DEFAULT_HISTORY_CAP,
            repeat_limit: DEFAULT_REPEAT_LIMIT,
            hard_policy: HardPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        info!(capacity = config.capacity, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the bind address.
    pub fn with_bind(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Game rules described by this configuration.
    pub fn rules(&self) -> Rules {
        Rules::new(self.repeat_limit, self.history_cap, self.hard_policy)
    }

    /// Builds an empty session store sized by this configuration.
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(
            self.capacity,
            Duration::from_secs(self.session_timeout_secs),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::new("capacity must be at least 1"));
        }
        if self.session_timeout_secs == 0 {
            return Err(ConfigError::new("session_timeout_secs must be at least 1"));
        }
        if self.repeat_limit == 0 {
            return Err(ConfigError::new("repeat_limit must be at least 1"));
        }
        Ok(())
    }
}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
