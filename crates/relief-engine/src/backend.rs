//! Unified engine backend.
//!
//! Enum dispatch over the concrete engines, because a session is generic
//! over one [`AllocationEngine`] type and async trait methods are not
//! dyn-compatible.

use relief_core::{AllocationEngine, EngineError, StubEngine};
use relief_types::{NextRoundResponse, Scenario, StagedEvent, StartRoundResponse};

use crate::config::{BackendType, EngineConfig};
use crate::error::BackendError;
use crate::http::HttpEngine;

/// The engine a console session talks to.
#[derive(Debug)]
pub enum EngineBackend {
    /// Remote allocation service.
    Http(HttpEngine),
    /// In-process deterministic stub.
    Stub(StubEngine),
}

impl AllocationEngine for EngineBackend {
    async fn start_simulation(
        &self,
        scenario: &Scenario,
    ) -> Result<StartRoundResponse, EngineError> {
        match self {
            Self::Http(engine) => engine.start_simulation(scenario).await,
            Self::Stub(engine) => engine.start_simulation(scenario).await,
        }
    }

    async fn advance_round(

        &self,

        events: &[StagedEvent],

    ) -> Result<NextRoundResponse, EngineError> {
        match self {
            Self::Http(engine) => engine.advance_round(events).await,
            Self::Stub(engine) => engine.advance_round(events).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Http(engine) => engine.name(),
            Self::Stub(engine) => engine.name(),
        }
    }
}

/// Create an engine backend from configuration.
///
/// # Errors
///
/// Returns [`BackendError::Client`] if the HTTP client cannot be built.
pub fn create_backend(config: &EngineConfig) -> Result<EngineBackend, BackendError> {
    match config.backend {
        BackendType::Http => Ok(EngineBackend::Http(HttpEngine::new(config)?)),
        BackendType::Stub => Ok(EngineBackend::Stub(StubEngine::new())),
    }
}
