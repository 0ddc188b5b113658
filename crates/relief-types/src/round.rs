//! Engine round responses and the immutable round record.
//!
//! The engine's start and next-round operations name their allocation
//! field differently (`initial_allocation` vs `round_allocation`). Both
//! responses are normalized into a single [`RoundRecord`] whose snapshot
//! lives in `allocation_snapshot`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::allocation::{Dispatch, ZoneAllocation};
use crate::events::StagedEvent;

/// Response body of the engine's start operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StartRoundResponse {
    /// Round number as reported by the engine.
    #[serde(default)]
    pub round_number: u32,
    /// Dispatch orders issued this round.
    #[serde(default)]
    pub dispatches: Vec<Dispatch>,
    /// Total demand left unserved across zones.
    #[serde(default)]
    pub remaining_demand: f64,
    /// The solver's explanation of this round.
    #[serde(default)]
    pub round_reasoning: String,
    /// Allocation state after the first round.
    pub initial_allocation: Vec<ZoneAllocation>,
    /// Narrative from the reasoning agent, when it ran.
    #[serde(default)]
    pub agent_reasoning: Option<String>,
    /// Events the engine reports as applied.
    #[serde(default)]
    pub events_applied: Option<serde_json::Value>,
    /// Whether the engine fell back to its heuristic path.
    #[serde(default)]
    pub fallback_used: Option<bool>,
}

/// Response body of the engine's next-round operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NextRoundResponse {
    /// Round number as reported by the engine.
    #[serde(default)]
    pub round_number: u32,
    /// Dispatch orders issued this round.
    #[serde(default)]
    pub dispatches: Vec<Dispatch>,
    /// Total demand left unserved across zones.
    #[serde(default)]
    pub remaining_demand: f64,
    /// The solver's explanation of this round.
    #[serde(default)]
    pub round_reasoning: String,
    /// Allocation state after this round.
    pub round_allocation: Vec<ZoneAllocation>,
    /// Events the engine reports as applied.
    #[serde(default)]
    pub events_applied: Option<serde_json::Value>,
    /// Whether the engine fell back to its heuristic path.
    #[serde(default)]
    pub fallback_used: Option<bool>,
}

/// One completed round, recorded exactly once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoundRecord {
    /// 1-based position of this round in the history.
    pub round_number: u32,
    /// Dispatch orders issued this round.
    pub dispatches: Vec<Dispatch>,
    /// Total demand left unserved across zones.
    pub remaining_demand: f64,
    /// The solver's explanation of this round.
    pub reasoning: String,
    /// Zone allocation state as of this round.
    pub allocation_snapshot: Vec<ZoneAllocation>,
    /// Narrative from the reasoning agent, when it ran.
    pub agent_reasoning: Option<String>,
    /// Events the engine reports as applied.
    pub events_applied: Option<serde_json::Value>,
    /// Whether the engine fell back to its heuristic path.
    pub fallback_used: bool,
    /// Events submitted to produce this round, in submission order.
    pub submitted_events: Vec<StagedEvent>,
    /// When the console recorded the round.
    pub recorded_at: DateTime<Utc>,
}

impl RoundRecord {
    /// Normalize the engine's start response into round 1.
    pub fn from_start(response: StartRoundResponse, submitted_events: Vec<StagedEvent>) -> Self {
        Self {
            round_number: 1,
            dispatches: response.dispatches,
            remaining_demand: response.remaining_demand,
            reasoning: response.round_reasoning,
            allocation_snapshot: response.initial_allocation,
            agent_reasoning: response.agent_reasoning,
            events_applied: response.events_applied,
            fallback_used: response.fallback_used.unwrap_or(false),
            submitted_events,
            recorded_at: Utc::now(),
        }
    }

    /// Normalize the engine's next-round response into round `round_number`.
    pub fn from_next(
        round_number: u32,
        response: NextRoundResponse,
        submitted_events: Vec<StagedEvent>,
    ) -> Self {
        Self {
            round_number,
            dispatches: response.dispatches,
            remaining_demand: response.remaining_demand,
            reasoning: response.round_reasoning,
            allocation_snapshot: response.round_allocation,
            agent_reasoning: None,
            events_applied: response.events_applied,
            fallback_used: response.fallback_used.unwrap_or(false),
            submitted_events,
            recorded_at: Utc::now(),
        }
    }
}
