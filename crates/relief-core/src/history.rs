//! Round history store.
//!
//! [`SimulationState`] is an append-only, 1-indexed sequence of immutable
//! [`RoundRecord`]s plus the `current_step` that selects which round the
//! view shows. Invariant: `current_step == 0` iff there are no rounds,
//! otherwise `1 <= current_step <= rounds`.
//!
//! Records are stored behind [`Arc`] so views and API responses can hold a
//! round without copying its allocation snapshot.

use std::sync::Arc;

use relief_types::RoundRecord;
use tracing::debug;

use crate::error::SimulationError;

/// Recorded rounds and the currently selected round.
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    rounds: Vec<Arc<RoundRecord>>,
    current_step: u32,
}

impl SimulationState {
    /// Create an empty history.
    pub const fn new() -> Self {
        Self {
            rounds: Vec::new(),
            current_step: 0,
        }
    }

    /// Append the next round and jump the view to it.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NonMonotonicRound`] unless
    /// `record.round_number == len() + 1`; the history is untouched.
    pub fn append(&mut self, record: RoundRecord) -> Result<Arc<RoundRecord>, SimulationError> {
        let expected = self.next_round_number()?;
        if record.round_number != expected {
            return Err(SimulationError::NonMonotonicRound {
                expected,
                got: record.round_number,
            });
        }

        let record = Arc::new(record);
        self.rounds.push(Arc::clone(&record));
        self.current_step = expected;
        debug!(round = expected, "round appended to history");
        Ok(record)
    }

    /// Select round `n` for display without touching the recorded rounds.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::RoundOutOfRange`] if `n` is not in `1..=len()`.
    pub fn select_round(&mut self, n: u32) -> Result<(), SimulationError> {
        let rounds = self.len();
        if n == 0 || n > rounds {
            return Err(SimulationError::RoundOutOfRange {
                requested: n,
                rounds,
            });
        }
        self.current_step = n;
        Ok(())
    }

    /// The selected round, or `None` if nothing has been recorded.
    pub fn current(&self) -> Option<&Arc<RoundRecord>> {
        self.round(self.current_step)
    }

    /// Round `n` (1-based), if recorded.
    pub fn round(&self, n: u32) -> Option<&Arc<RoundRecord>> {
        let index = usize::try_from(n).ok()?.checked_sub(1)?;
        self.rounds.get(index)
    }

    /// All rounds in order.
    pub fn rounds(&self) -> &[Arc<RoundRecord>] {
        &self.rounds
    }

    /// The selected round number (`0` when empty).
    pub const fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Number of recorded rounds.
    pub fn len(&self) -> u32 {
        u32::try_from(self.rounds.len()).unwrap_or(u32::MAX)
    }

    /// Whether no round has been recorded.
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// The round number the next append must carry.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ArithmeticOverflow`] if the history is full.
    pub fn next_round_number(&self) -> Result<u32, SimulationError> {
        self.len()
            .checked_add(1)
            .ok_or(SimulationError::ArithmeticOverflow)
    }
}

#[cfg(test)]
mod tests {
    use relief_types::StartRoundResponse;

    use super::*;

    fn record(round_number: u32) -> RoundRecord {
        let response = StartRoundResponse {
            round_number,
            dispatches: Vec::new(),
            remaining_demand: 0.0,
            round_reasoning: format!("round {round_number}"),
            initial_allocation: Vec::new(),
            agent_reasoning: None,
            events_applied: None,
            fallback_used: None,
        };
        let mut record = RoundRecord::from_start(response, Vec::new());
        record.round_number = round_number;
        record
    }

    #[test]
    fn empty_history_has_no_current_round() {
        let state = SimulationState::new();
        assert!(state.is_empty());
        assert_eq!(state.current_step(), 0);
        assert!(state.current().is_none());
    }

    #[test]
    fn append_advances_current_step() {
        let mut state = SimulationState::new();
        assert!(state.append(record(1)).is_ok());
        assert!(state.append(record(2)).is_ok());
        assert_eq!(state.len(), 2);
        assert_eq!(state.current_step(), 2);
        assert_eq!(state.current().map(|r| r.round_number), Some(2));
    }

    #[test]
    fn non_monotonic_append_is_rejected_without_mutation() {
        let mut state = SimulationState::new();
        let _ = state.append(record(1));

        for bad in [0, 1, 3, 10] {
            let result = state.append(record(bad));
            assert!(matches!(
                result,
                Err(SimulationError::NonMonotonicRound { expected: 2, .. })
            ));
        }
        assert_eq!(state.len(), 1);
        assert_eq!(state.current_step(), 1);
    }

    #[test]
    fn select_round_changes_only_current_step() {
        let mut state = SimulationState::new();
        for n in 1..=3 {
            let _ = state.append(record(n));
        }
        let before: Vec<u32> = state.rounds().iter().map(|r| r.round_number).collect();

        assert!(state.select_round(1).is_ok());
        assert_eq!(state.current_step(), 1);
        assert_eq!(state.current().map(|r| r.reasoning.as_str()), Some("round 1"));

        let after: Vec<u32> = state.rounds().iter().map(|r| r.round_number).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn select_round_out_of_range_leaves_state() {
        let mut state = SimulationState::new();
        let _ = state.append(record(1));
        let _ = state.append(record(2));

        for bad in [0, 3] {
            let result = state.select_round(bad);
            assert!(matches!(
                result,
                Err(SimulationError::RoundOutOfRange { rounds: 2, .. })
            ));
            assert_eq!(state.current_step(), 2);
        }
    }

    #[test]
    fn select_round_on_empty_history_fails() {
        let mut state = SimulationState::new();
        assert!(state.select_round(1).is_err());
        assert_eq!(state.current_step(), 0);
    }
}
