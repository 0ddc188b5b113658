//! Allocation engine backends for the Relief console.
//!
//! The controller in `relief-core` talks to an [`AllocationEngine`]; this
//! crate supplies the production one ([`HttpEngine`], a `reqwest` client
//! for the remote optimization service) and the [`EngineBackend`] enum the
//! console uses to pick between it and the offline stub at startup.
//!
//! [`AllocationEngine`]: relief_core::AllocationEngine
//! [`HttpEngine`]: http::HttpEngine
//! [`EngineBackend`]: backend::EngineBackend

pub mod backend;
pub mod config;
pub mod error;
pub mod http;

pub use backend::{EngineBackend, create_backend};
pub use config::{BackendType, EngineConfig};
pub use error::BackendError;
pub use http::HttpEngine;
