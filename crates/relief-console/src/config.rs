//! Configuration loading for the operator console.
//!
//! The canonical configuration lives in `relief-config.yaml`. Each section
//! defaults independently, so a missing file, a missing section, or a
//! missing key all fall back to the values below.
//!
//! Environment variables override YAML values:
//! - `ENGINE_URL` overrides `engine.base_url`
//! - `ENGINE_BACKEND` overrides `engine.backend`
//! - `CONSOLE_PORT` overrides `server.port`

use std::path::{Path, PathBuf};

use relief_engine::{BackendType, EngineConfig};
use serde::Deserialize;
use tracing::info;

/// Config file used when neither a CLI argument nor `RELIEF_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "relief-config.yaml";

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

    /// An environment override held an unusable value.
    #[error("invalid {var}: {message}")]
    Override {
        /// The environment variable name.
        var: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level console configuration, mirroring `relief-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConsoleConfig {
    /// Allocation engine connection.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Operator API listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Operator API listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8090,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            json: false,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Override`] for an unusable environment value.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults.
    ///
    /// Environment overrides apply in both cases.
    ///
    /// # Errors
    ///
    /// See [`ConsoleConfig::from_file`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides()?;
            Ok(config)
        }
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply `ENGINE_URL`, `ENGINE_BACKEND`, and `CONSOLE_PORT`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Override`] for an unusable value.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Override`] for an unusable value.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("ENGINE_URL") {
            self.engine.base_url = url;
        }
        if let Some(backend) = lookup("ENGINE_BACKEND") {
            self.engine.backend =
                backend
                    .parse::<BackendType>()
                    .map_err(|e| ConfigError::Override {
                        var: "ENGINE_BACKEND",
                        message: e.to_string(),
                    })?;
        }
        if let Some(port) = lookup("CONSOLE_PORT") {
            self.server.port = port.trim().parse().map_err(|e| ConfigError::Override {
                var: "CONSOLE_PORT",
                message: format!("{port:?}: {e}"),
            })?;
        }
        Ok(())
    }
}

/// Pick the config path: first CLI argument, then `RELIEF_CONFIG`, then
/// [`DEFAULT_CONFIG_PATH`].
pub fn resolve_path(cli_arg: Option<String>, env_value: Option<String>) -> PathBuf {
    cli_arg
        .or(env_value)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}
