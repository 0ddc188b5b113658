//! Round executor: the guarded transitions that create rounds.
//!
//! The executor owns the [`SimulationState`] together with the two
//! single-flight guards that keep round numbering monotonic:
//!
//! - a start latch, set before the engine call is issued and never cleared,
//!   so a second start is a silent no-op even while the first is pending;
//! - an in-flight flag for advances, held for the duration of one engine
//!   call, so an overlapping advance is rejected instead of racing.
//!
//! Engine failures abort the transition before anything is appended.
//!
//! # Architecture
//!
//! ```text
//! start_simulation ──latch──> engine.start_simulation ──normalize──> append(round 1)
//! advance_round ──in-flight──> engine.advance_round ──normalize──> append(round n+1)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use relief_types::{RoundRecord, Scenario, StagedEvent};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::engine::AllocationEngine;
use crate::error::SimulationError;
use crate::history::SimulationState;

/// Holds the advance flag for one engine call and clears it on drop.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Sequences engine calls into recorded rounds.
#[derive(Debug)]
pub struct RoundExecutor<E> {
    engine: E,
    state: RwLock<SimulationState>,
    started: AtomicBool,
    advancing: AtomicBool,
}

impl<E: AllocationEngine> RoundExecutor<E> {
    /// Create an executor with an empty history.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: RwLock::new(SimulationState::new()),
            started: AtomicBool::new(false),
            advancing: AtomicBool::new(false),
        }
    }

    /// The engine this executor calls.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Whether a start has been issued (successful or not).
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Whether an advance is currently outstanding.
    pub fn is_advancing(&self) -> bool {
        self.advancing.load(Ordering::Acquire)
    }

    /// Run the first round, at most once per executor.
    ///
    /// Returns `Ok(None)` when a start was already issued. The latch stays
    /// set after a failure.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::EngineFailure`] if the engine call fails,
    /// or [`SimulationError::NonMonotonicRound`] if history is not empty.
    pub async fn start_simulation(
        &self,
        scenario: &Scenario,
    ) -> Result<Option<Arc<RoundRecord>>, SimulationError> {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!(engine = self.engine.name(), "start already issued, ignoring trigger");
            return Ok(None);
        }

        info!(
            engine = self.engine.name(),
            disaster_type = ?scenario.disaster_type,
            zones = scenario.zones.len(),
            events = scenario.events.len(),
            use_agent = scenario.use_agent,
            "starting simulation"
        );

        let response = self
            .engine
            .start_simulation(scenario)
            .await
            .inspect_err(|e| warn!(error = %e, "start simulation failed"))?;

        if response.round_number != 1 {
            debug!(
                reported = response.round_number,
                "engine reported a different first round number"
            );
        }

        let record = RoundRecord::from_start(response, scenario.events.clone());
        let record = self.state.write().await.append(record)?;
        info!(
            round = record.round_number,
            zones = record.allocation_snapshot.len(),
            remaining_demand = record.remaining_demand,
            fallback_used = record.fallback_used,
            "round recorded"
        );
        Ok(Some(record))
    }

    /// Compute and record the next round with `events` applied in order.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::RoundInFlight`] if another advance is
    /// outstanding, [`SimulationError::NotStarted`] if round 1 is not
    /// recorded yet, or [`SimulationError::EngineFailure`] if the engine
    /// call fails. History is unchanged in every error case.
    pub async fn advance_round(
        &self,
        events: &[StagedEvent],
    ) -> Result<Arc<RoundRecord>, SimulationError> {
        let _in_flight = InFlight::acquire(&self.advancing).ok_or(SimulationError::RoundInFlight)?;

        let round_number = {
            let state = self.state.read().await;
            if state.is_empty() {
                return Err(SimulationError::NotStarted);
            }
            state.next_round_number()?
        };

        info!(
            engine = self.engine.name(),
            round = round_number,
            events = events.len(),
            "advancing round"
        );

        let response = self
            .engine
            .advance_round(events)
            .await
            .inspect_err(|e| warn!(round = round_number, error = %e, "advance round failed"))?;

        let record = RoundRecord::from_next(round_number, response, events.to_vec());
        let record = self.state.write().await.append(record)?;
        info!(
            round = record.round_number,
            zones = record.allocation_snapshot.len(),
            remaining_demand = record.remaining_demand,
            fallback_used = record.fallback_used,
            "round recorded"
        );
        Ok(record)
    }

    /// Move the view to round `n`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::RoundOutOfRange`] if `n` is not recorded.
    pub async fn select_round(&self, n: u32) -> Result<(), SimulationError> {
        self.state.write().await.select_round(n)?;
        debug!(round = n, "round selected");
        Ok(())
    }

    /// A point-in-time copy of the history (records are shared, not cloned).
    pub async fn snapshot(&self) -> SimulationState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use relief_types::{DisasterType, NextRoundResponse, StartRoundResponse};
    use tokio::sync::Notify;

    use super::*;
    use crate::engine::{EngineError, EngineOperation, StubEngine};

    fn scenario() -> Scenario {
        Scenario {
            disaster_type: DisasterType::Flood,
            coordinates: None,
            zones: Vec::new(),
            events: Vec::new(),
            use_agent: false,
        }
    }

    /// Engine whose calls park until released, to hold operations in flight.
    #[derive(Default)]
    struct GatedEngine {
        gate: Notify,
    }

    impl AllocationEngine for GatedEngine {
        async fn start_simulation(
            &self,
            _scenario: &Scenario,
        ) -> Result<StartRoundResponse, EngineError> {
            self.gate.notified().await;
            Ok(StartRoundResponse {
                round_number: 1,
                dispatches: Vec::new(),
                remaining_demand: 0.0,
                round_reasoning: String::new(),
                initial_allocation: Vec::new(),
                agent_reasoning: None,
                events_applied: None,
                fallback_used: None,
            })
        }

        async fn advance_round(
            &self,
            _events: &[StagedEvent],
        ) -> Result<NextRoundResponse, EngineError> {
            self.gate.notified().await;
            Ok(NextRoundResponse {
                round_number: 0,
                dispatches: Vec::new(),
                remaining_demand: 0.0,
                round_reasoning: String::new(),
                round_allocation: Vec::new(),
                events_applied: None,
                fallback_used: None,
            })
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    /// Engine that always fails.
    struct DownEngine;

    impl AllocationEngine for DownEngine {
        async fn start_simulation(
            &self,
            _scenario: &Scenario,
        ) -> Result<StartRoundResponse, EngineError> {
            Err(EngineError::Transport {
                operation: EngineOperation::StartSimulation,
                message: String::from("connection refused"),
            })
        }

        async fn advance_round(
            &self,
            _events: &[StagedEvent],
        ) -> Result<NextRoundResponse, EngineError> {
            Err(EngineError::Status {
                operation: EngineOperation::AdvanceRound,
                status: 500,
                body: String::from("solver crashed"),
            })
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    #[tokio::test]
    async fn concurrent_starts_record_one_round() {
        let executor = RoundExecutor::new(GatedEngine::default());
        let scenario = scenario();

        let (first, second, ()) = tokio::join!(
            executor.start_simulation(&scenario),
            executor.start_simulation(&scenario),
            async {
                tokio::task::yield_now().await;
                executor.engine().gate.notify_one();
            }
        );

        let recorded = [&first, &second]
            .iter()
            .filter(|r| matches!(r, Ok(Some(_))))
            .count();
        let skipped = [&first, &second]
            .iter()
            .filter(|r| matches!(r, Ok(None)))
            .count();
        assert_eq!(recorded, 1);
        assert_eq!(skipped, 1);

        let state = executor.snapshot().await;
        assert_eq!(state.len(), 1);
        assert_eq!(state.current_step(), 1);
    }

    #[tokio::test]
    async fn overlapping_advance_is_rejected() {
        let executor = RoundExecutor::new(GatedEngine::default());
        let scenario = scenario();
        let (started, ()) = tokio::join!(executor.start_simulation(&scenario), async {
            tokio::task::yield_now().await;
            executor.engine().gate.notify_one();
        });
        assert!(matches!(started, Ok(Some(_))));

        let (first, second, ()) = tokio::join!(
            executor.advance_round(&[]),
            async {
                tokio::task::yield_now().await;
                executor.advance_round(&[]).await
            },
            async {
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;
                executor.engine().gate.notify_one();
            }
        );

        assert_eq!(first.unwrap().round_number, 2);
        assert!(matches!(second, Err(SimulationError::RoundInFlight)));
        assert!(!executor.is_advancing());
        assert_eq!(executor.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn advance_before_start_is_rejected() {
        let executor = RoundExecutor::new(StubEngine::new());
        let result = executor.advance_round(&[]).await;
        assert!(matches!(result, Err(SimulationError::NotStarted)));
        assert!(!executor.is_advancing());
    }

    #[tokio::test]
    async fn failed_start_keeps_latch_and_records_nothing() {
        let executor = RoundExecutor::new(DownEngine);
        let result = executor.start_simulation(&scenario()).await;
        assert!(matches!(result, Err(SimulationError::EngineFailure(_))));
        assert!(executor.is_started());
        assert!(executor.snapshot().await.is_empty());

        let retry = executor.start_simulation(&scenario()).await;
        assert!(matches!(retry, Ok(None)));
    }

    #[tokio::test]
    async fn sequential_advances_number_rounds_by_position() {
        let executor = RoundExecutor::new(StubEngine::new());
        let _ = executor.start_simulation(&scenario()).await.unwrap();
        for _ in 0..4 {
            let _ = executor.advance_round(&[]).await.unwrap();
        }

        let state = executor.snapshot().await;
        for (i, round) in state.rounds().iter().enumerate() {
            assert_eq!(usize::try_from(round.round_number).unwrap(), i + 1);
        }
        assert_eq!(state.current_step(), 5);
    }
}
