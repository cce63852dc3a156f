//! Configuration loading and typed config structures for the traffic light
//! service.
//!
//! The configuration lives in `trafficlight-config.yaml` in the working
//! directory. Every field has a default, so an absent file or an empty
//! document yields a runnable service (port 8080, 5 second cycle, 5 second
//! pedestrian wait).
//!
//! Environment variables override the bind address:
//! - `TRAFFICLIGHT_HOST` overrides `server.host`
//! - `TRAFFICLIGHT_PORT` overrides `server.port` (ignored unless it parses
//!   as a `u16`)

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable overriding `server.host`.
pub const HOST_ENV: &str = "TRAFFICLIGHT_HOST";

/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "TRAFFICLIGHT_PORT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `trafficlight-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrafficLightConfig {
    /// HTTP bind settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Cycle and pedestrian timing.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrafficLightConfig {
    /// Load configuration from a YAML file at the given path, then apply
    /// environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either timing interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.cycle_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "timing.cycle_interval_ms must be at least 1".to_owned(),
            });
        }
        if self.timing.pedestrian_wait_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "timing.pedestrian_wait_ms must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// HTTP bind settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    /// Override the bind address from `TRAFFICLIGHT_HOST` / `TRAFFICLIGHT_PORT`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override the bind address using `lookup` in place of the process
    /// environment.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup(PORT_ENV).and_then(|p| p.trim().parse::<u16>().ok()) {
            self.port = port;
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Automatic cycle and pedestrian crossing timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Real-time milliseconds between automatic advances.
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,

    /// Milliseconds a pedestrian crossing holds Red before forcing Green.
    #[serde(default = "default_pedestrian_wait_ms")]
    pub pedestrian_wait_ms: u64,
}

impl TimingConfig {
    /// The automatic cycle period.
    pub const fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    /// The pedestrian crossing wait.
    pub const fn pedestrian_wait(&self) -> Duration {
        Duration::from_millis(self.pedestrian_wait_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: default_cycle_interval_ms(),
            pedestrian_wait_ms: default_pedestrian_wait_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_cycle_interval_ms() -> u64 {
    5_000
}

const fn default_pedestrian_wait_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_owned()
}
