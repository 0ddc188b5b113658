//! Shared application state for the operator API.
//!
//! The console drives one session at a time. A reset swaps in a fresh
//! session built from the same engine configuration; requests already
//! holding the previous session finish against it.

use std::sync::Arc;

use relief_core::{AllocationEngine, SimulationError, SimulationSession};
use relief_engine::{BackendError, EngineBackend, EngineConfig, create_backend};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::ApiError;

/// The session type the console serves.
pub type ConsoleSession = SimulationSession<EngineBackend>;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    engine: EngineConfig,
    session: RwLock<Arc<ConsoleSession>>,
}

impl AppState {
    /// Create state around a fresh session whose engine is built from
    /// `engine`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the engine backend cannot be built.
    pub fn new(engine: EngineConfig) -> Result<Self, BackendError> {
        let session = Arc::new(SimulationSession::new(create_backend(&engine)?));
        Ok(Self {
            engine,
            session: RwLock::new(session),
        })
    }

    /// The session currently being driven.
    pub async fn session(&self) -> Arc<ConsoleSession> {
        Arc::clone(&*self.session.read().await)
    }

    /// Replace the current session with a fresh one: empty history, no
    /// staged events, start latch cleared, new engine backend.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::RoundInFlight`] (as an [`ApiError`]) while
    /// the current session has an advance outstanding, or
    /// [`ApiError::Backend`] if the new backend cannot be built.
    pub async fn reset(&self) -> Result<Arc<ConsoleSession>, ApiError> {
        let mut current = self.session.write().await;
        if current.status().await.advance_in_flight {
            return Err(SimulationError::RoundInFlight.into());
        }

        let fresh = Arc::new(SimulationSession::new(create_backend(&self.engine)?));
        info!(
            previous = %current.id(),
            session = %fresh.id(),
            engine = fresh.engine().name(),
            "simulation session reset"
        );
        *current = Arc::clone(&fresh);
        Ok(fresh)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use relief_engine::BackendType;

    use super::*;

    fn stub_state() -> AppState {
        AppState::new(EngineConfig {
            backend: BackendType::Stub,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn reset_swaps_in_a_new_session() {
        let state = stub_state();
        let before = state.session().await;
        let after = state.reset().await.unwrap();

        assert_ne!(before.id(), after.id());
        assert_eq!(state.session().await.id(), after.id());
        assert_eq!(after.engine().name(), "stub");
    }
}
