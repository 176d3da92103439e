//! Client configuration, read from an optional RON file.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```ron
//! (
//!     base_url: "http://127.0.0.1:8000",
//!     poll_interval_ms: 2000,
//!     logging: (target: Both, level: "debug", file: "clone_client.log"),
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clone_engine::{ApiSettings, DEFAULT_POLL_INTERVAL};
use clone_logging::{LevelFilter, LogDestination};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub target: LogTarget,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            target: LogTarget::Terminal,
            level: "info".to_string(),
            file: PathBuf::from("./clone_client.log"),
        }
    }
}

impl LoggingConfig {
    pub fn destination(&self) -> LogDestination {
        match self.target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File(self.file.clone()),
            LogTarget::Both => LogDestination::Both(self.file.clone()),
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.level)))
    }

    /// Installs the global logger. Returns false if one was already set.
    pub fn install(&self) -> Result<bool, ConfigError> {
        Ok(clone_logging::initialize(
            self.destination(),
            self.level_filter()?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Also send `DELETE /api/clone/{id}` when a poll is reset.
    pub cancel_remote_on_reset: bool,
    pub logging: LoggingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            base_url: api.base_url,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
            cancel_remote_on_reset: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = Url::parse(&self.base_url)
            .map_err(|err| ConfigError::Invalid(format!("base_url {:?}: {err}", self.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "base_url {:?} cannot be used as a base",
                self.base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        self.logging.level_filter().map(|_| ())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
