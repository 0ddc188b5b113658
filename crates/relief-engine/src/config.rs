//! Engine backend configuration.
//!
//! Deserialized from the `engine` section of `relief-config.yaml`. Every
//! field has a default so a partial (or absent) section still yields a
//! usable configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Default engine base URL (the local allocation service).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Which engine implementation backs a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Remote allocation service over HTTP.
    #[default]
    Http,
    /// In-process deterministic stub.
    Stub,
}

impl FromStr for BackendType {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "remote" => Ok(Self::Http),
            "stub" | "offline" => Ok(Self::Stub),
            other => Err(BackendError::UnknownBackend(other.to_owned())),
        }
    }
}

/// Connection settings for the allocation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Backend implementation.
    pub backend: BackendType,
    /// Base URL; `/optimize` and `/next-round` are appended.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::default(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    /// The request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
