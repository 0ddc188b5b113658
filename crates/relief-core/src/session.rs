//! A simulation session: one operator run from start to its last round.
//!
//! [`SimulationSession`] composes the draft buffer with the round executor.
//! All guards live inside the session, so independent sessions (for
//! example one per test) never interfere with each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use relief_types::{RoundRecord, Scenario, SessionId, StagedEvent};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::catalog::EventCatalog;
use crate::draft::EventDraftBuffer;
use crate::engine::AllocationEngine;
use crate::error::SimulationError;
use crate::executor::RoundExecutor;
use crate::history::SimulationState;
use crate::projector::{self, RoundView};

/// JSON-serializable status of a session for the operator API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    /// Session identifier.
    pub session_id: SessionId,
    /// Whether a start has been issued.
    pub started: bool,
    /// Whether an advance is outstanding.
    pub advance_in_flight: bool,
    /// Number of recorded rounds.
    pub rounds: u32,
    /// Selected round (`0` when empty).
    pub current_step: u32,
    /// Number of staged events.
    pub staged_events: usize,
}

/// One operator run against an allocation engine.
#[derive(Debug)]
pub struct SimulationSession<E> {
    id: SessionId,
    executor: RoundExecutor<E>,
    drafts: Mutex<EventDraftBuffer>,
}

impl<E: AllocationEngine> SimulationSession<E> {
    /// Create a fresh session with empty history and no staged events.
    pub fn new(engine: E) -> Self {
        Self {
            id: SessionId::new(),
            executor: RoundExecutor::new(engine),
            drafts: Mutex::new(EventDraftBuffer::new()),
        }
    }

    /// This session's identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The engine backing this session.
    pub const fn engine(&self) -> &E {
        self.executor.engine()
    }

    /// Start the simulation. A repeated start is a silent no-op (`Ok(None)`).
    ///
    /// Scenario events are checked against the catalog before the start
    /// latch is touched, so invalid input can be corrected and resubmitted.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::MissingParameter`] for an incomplete
    /// scenario event, or [`SimulationError::EngineFailure`].
    pub async fn start(
        &self,
        scenario: &Scenario,
    ) -> Result<Option<Arc<RoundRecord>>, SimulationError> {
        for event in &scenario.events {
            EventCatalog::validate(event.event_type, &event.params)?;
        }
        self.executor.start_simulation(scenario).await
    }

    /// Validate and stage an event for the next round.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownEventKind`] or
    /// [`SimulationError::MissingParameter`]; nothing is staged.
    pub async fn stage_event(
        &self,
        kind: &str,
        params: BTreeMap<String, String>,
    ) -> Result<StagedEvent, SimulationError> {
        let mut drafts = self.drafts.lock().await;
        let event = drafts
            .stage(kind, params)
            .inspect_err(|e| warn!(session = %self.id, kind, error = %e, "event rejected"))?;
        info!(session = %self.id, kind, staged = drafts.len(), "event staged");
        Ok(event)
    }

    /// The staged events, in staging order.
    pub async fn staged_events(&self) -> Vec<StagedEvent> {
        self.drafts.lock().await.peek().to_vec()
    }

    /// Drop one staged event.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::StagedEventNotFound`] for a bad index.
    pub async fn discard_event(&self, index: usize) -> Result<StagedEvent, SimulationError> {
        let mut drafts = self.drafts.lock().await;
        let event = drafts.discard(index)?;
        info!(session = %self.id, index, kind = %event.event_type, "staged event discarded");
        Ok(event)
    }

    /// Submit every staged event and record the next round.
    ///
    /// The buffer is empty afterwards on success. On failure the drained
    /// events go back to the front of the buffer and history is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NotStarted`], [`SimulationError::RoundInFlight`],
    /// or [`SimulationError::EngineFailure`].
    pub async fn submit_round(&self) -> Result<Arc<RoundRecord>, SimulationError> {
        if self.executor.is_advancing() {
            return Err(SimulationError::RoundInFlight);
        }

        let events = self.drafts.lock().await.drain();
        match self.executor.advance_round(&events).await {
            Ok(record) => Ok(record),
            Err(e) => {
                if !events.is_empty() {
                    warn!(
                        session = %self.id,
                        restored = events.len(),
                        "round not recorded, staged events restored"
                    );
                }
                self.drafts.lock().await.restore(events);
                Err(e)
            }
        }
    }

    /// Show round `n` instead of the newest one.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::RoundOutOfRange`].
    pub async fn select_round(&self, n: u32) -> Result<(), SimulationError> {
        self.executor.select_round(n).await
    }

    /// A point-in-time copy of the round history.
    pub async fn state(&self) -> SimulationState {
        self.executor.snapshot().await
    }

    /// The projection of the selected round.
    pub async fn view(&self) -> Option<RoundView> {
        projector::project(&self.executor.snapshot().await)
    }

    /// Session status summary.
    pub async fn status(&self) -> SessionStatus {
        let state = self.executor.snapshot().await;
        let staged_events = self.drafts.lock().await.len();
        SessionStatus {
            session_id: self.id,
            started: self.executor.is_started(),
            advance_in_flight: self.executor.is_advancing(),
            rounds: state.len(),
            current_step: state.current_step(),
            staged_events,
        }
    }
}
