//! Errors raised while constructing an engine backend.
//!
//! Failures of the engine calls themselves are
//! [`relief_core::EngineError`]; these only cover setup.

/// Backend construction failures.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The configured backend name is not recognised.
    #[error("unknown engine backend: {0}")]
    UnknownBackend(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
