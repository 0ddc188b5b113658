//! Error types for the `relief-core` crate.
//!
//! Operator input errors (`UnknownEventKind`, `MissingParameter`,
//! `StagedEventNotFound`) are resolved at the draft buffer boundary and
//! never reach the engine. `NonMonotonicRound` and `RoundOutOfRange` signal
//! invariant violations. `EngineFailure` is recoverable: the simulation
//! state is left exactly as it was before the failed transition.

use relief_types::EventKind;

use crate::engine::EngineError;

/// Errors that can occur while driving a simulation session.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The event kind is not registered in the catalog.
    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    /// A required parameter is absent or blank.
    #[error("event {kind} is missing required parameter {name}")]
    MissingParameter {
        /// The event kind being staged.
        kind: EventKind,
        /// The first missing parameter, in descriptor order.
        name: &'static str,
    },

    /// No staged event exists at the given position.
    #[error("no staged event at index {index} ({staged} staged)")]
    StagedEventNotFound {
        /// The requested index.
        index: usize,
        /// How many events are currently staged.
        staged: usize,
    },

    /// A round record was appended out of sequence.
    #[error("round {got} appended out of order (expected {expected})")]
    NonMonotonicRound {
        /// The only round number the history would accept.
        expected: u32,
        /// The round number that was offered.
        got: u32,
    },

    /// A round outside `1..=rounds` was selected.
    #[error("round {requested} is out of range (history has {rounds} rounds)")]
    RoundOutOfRange {
        /// The requested round number.
        requested: u32,
        /// Number of recorded rounds.
        rounds: u32,
    },

    /// An advance was requested while another is still outstanding.
    #[error("a round transition is already in flight")]
    RoundInFlight,

    /// An advance was requested before round 1 was recorded.
    #[error("simulation has not started")]
    NotStarted,

    /// The round counter cannot be advanced any further.
    #[error("arithmetic overflow in round numbering")]
    ArithmeticOverflow,

    /// The allocation engine failed or rejected the request.
    #[error("engine failure: {0}")]
    EngineFailure(#[from] EngineError),
}

impl SimulationError {
    /// Whether the operator can recover by correcting input or retrying.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownEventKind(_)
                | Self::MissingParameter { .. }
                | Self::StagedEventNotFound { .. }
                | Self::RoundInFlight
                | Self::NotStarted
                | Self::EngineFailure(_)
        )
    }
}
