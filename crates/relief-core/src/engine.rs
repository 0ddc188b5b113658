//! Allocation engine trait and stub implementation.
//!
//! The remote optimization engine is a black box with two operations:
//! start a simulation from a [`Scenario`] and compute the next round from
//! a list of events. The [`AllocationEngine`] trait abstracts the mechanism
//! -- an HTTP service in production, or the [`StubEngine`] for offline runs
//! and tests.
//!
//! The [`StubEngine`] serves a fixed number of demand units per zone per
//! round from two hospitals, applies route closures and weather/flood
//! penalties, and rejects non-numeric penalty values the way the real
//! engine does.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Mutex;

use relief_types::{
    AssignedResource, Dispatch, EventKind, HospitalId, NextRoundResponse, Priority, Scenario,
    StagedEvent, StartRoundResponse, ZoneAllocation, ZoneDemand, ZoneId,
};
use serde_json::Number;

/// Which engine operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOperation {
    /// The first-round optimization.
    StartSimulation,
    /// A subsequent round with operator events.
    AdvanceRound,
}

impl core::fmt::Display for EngineOperation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StartSimulation => f.write_str("Optimization"),
            Self::AdvanceRound => f.write_str("Next round"),
        }
    }
}

/// Errors reported by an allocation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The request never produced a response (connection, timeout).
    #[error("{operation} request failed: {message}")]
    Transport {
        /// The operation being attempted.
        operation: EngineOperation,
        /// Transport-level description.
        message: String,
    },

    /// The engine answered with a non-success status.
    #[error("{operation} failed ({status}): {body}")]
    Status {
        /// The operation being attempted.
        operation: EngineOperation,
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("{operation} response could not be decoded: {message}")]
    Decode {
        /// The operation being attempted.
        operation: EngineOperation,
        /// Decoder description.
        message: String,
    },

    /// The engine refused the request contents.
    #[error("{operation} rejected: {message}")]
    Rejected {
        /// The operation being attempted.
        operation: EngineOperation,
        /// Why the request was refused.
        message: String,
    },
}

/// A source of round allocations.
///
/// Both operations may suspend on I/O. Implementations must not record
/// anything themselves; the caller decides whether a response becomes a
/// round.
pub trait AllocationEngine: Send + Sync {
    /// Compute the first round for `scenario`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on transport, status, or decode failure.
    fn start_simulation(
        &self,
        scenario: &Scenario,
    ) -> impl Future<Output = Result<StartRoundResponse, EngineError>> + Send;

    /// Compute the next round, applying `events` in order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on transport, status, or decode failure.
    fn advance_round(
        &self,
        events: &[StagedEvent],
    ) -> impl Future<Output = Result<NextRoundResponse, EngineError>> + Send;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Stub engine
// ---------------------------------------------------------------------------

/// Demand units each zone receives per round.
const UNITS_PER_ROUND: f64 = 40.0;

/// Zones at or above this demand also get air support.
const AIR_SUPPORT_THRESHOLD: f64 = 100.0;

/// Primary hospital in the stub network.
const PRIMARY_HOSPITAL: &str = "H1";

/// Backup hospital used when the primary's route is closed.
const BACKUP_HOSPITAL: &str = "H2";

/// Mutable stub state: the scenario zones and accumulated perturbations.
#[derive(Debug, Clone, Default)]
struct StubState {
    zones: Vec<ZoneDemand>,
    round: u32,
    penalty: f64,
    severity_factor: f64,
    closed_routes: BTreeSet<(HospitalId, ZoneId)>,
}

/// A deterministic in-process engine.
#[derive(Debug, Default)]
pub struct StubEngine {
    state: Mutex<StubState>,
}

impl StubEngine {
    /// Create a new stub engine.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        operation: EngineOperation,
        f: impl FnOnce(&mut StubState) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut guard = self.state.lock().map_err(|e| EngineError::Rejected {
            operation,
            message: format!("stub state poisoned: {e}"),
        })?;
        f(&mut guard)
    }
}

impl AllocationEngine for StubEngine {
    async fn start_simulation(
        &self,
        scenario: &Scenario,
    ) -> Result<StartRoundResponse, EngineError> {
        let operation = EngineOperation::StartSimulation;
        self.with_state(operation, |state| {
            let mut next = StubState {
                zones: scenario.zones.clone(),
                round: 1,
                severity_factor: 1.0,
                ..StubState::default()
            };
            let applied = apply_events(&mut next, &scenario.events, operation)?;
            let (allocation, dispatches, remaining) = allocate(&next);
            *state = next;
            Ok(StartRoundResponse {
                round_number: 1,
                dispatches,
                remaining_demand: remaining,
                round_reasoning: format!(
                    "Served up to {UNITS_PER_ROUND} units per zone from {PRIMARY_HOSPITAL}"
                ),
                initial_allocation: allocation,
                agent_reasoning: scenario
                    .use_agent
                    .then(|| String::from("Stub agent: highest unserved demand first")),
                events_applied: applied,
                fallback_used: Some(false),
            })
        })
    }

    async fn advance_round(

        &self,

        events: &[StagedEvent],

    ) -> Result<NextRoundResponse, EngineError> {
        let operation = EngineOperation::AdvanceRound;
        self.with_state(operation, |state| {
            if state.round == 0 {
                return Err(EngineError::Rejected {
                    operation,
                    message: String::from("no simulation in progress"),
                });
            }
            // Perturbations only stick when the whole batch applies.
            let mut next = state.clone();
            let applied = apply_events(&mut next, events, operation)?;
            next.round = next.round.saturating_add(1);
            let (allocation, dispatches, remaining) = allocate(&next);
            let round_number = next.round;
            *state = next;
            Ok(NextRoundResponse {
                round_number,
                dispatches,
                remaining_demand: remaining,
                round_reasoning: format!("Round {round_number} after {} event(s)", events.len()),
                round_allocation: allocation,
                events_applied: applied,
                fallback_used: Some(false),
            })
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Apply events in order and summarise them as `{kind: count}`.
fn apply_events(
    state: &mut StubState,
    events: &[StagedEvent],
    operation: EngineOperation,
) -> Result<Option<serde_json::Value>, EngineError> {
    if events.is_empty() {
        return Ok(None);
    }

    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    for event in events {
        match event.event_type {
            EventKind::RoadCollapse | EventKind::BridgeOut => {
                let hospital = required(event, "hospital_id", operation)?;
                let zone = required(event, "zone_id", operation)?;
                state
                    .closed_routes
                    .insert((HospitalId::from(hospital), ZoneId::from(zone)));
            }
            EventKind::Weather => {
                state.penalty += numeric(event, "penalty", operation)?;
            }
            EventKind::Flood => {
                state.severity_factor *= numeric(event, "severity_factor", operation)?;
            }
        }
        let count = counts.entry(event.event_type.as_str()).or_insert(0);
        *count = count.saturating_add(1);
    }

    Ok(Some(serde_json::json!(counts)))
}

fn required<'a>(
    event: &'a StagedEvent,
    name: &str,
    operation: EngineOperation,
) -> Result<&'a str, EngineError> {
    event
        .params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| EngineError::Rejected {
            operation,
            message: format!("{} requires {name}", event.event_type),
        })
}

fn numeric(
    event: &StagedEvent,
    name: &str,
    operation: EngineOperation,
) -> Result<f64, EngineError> {
    let raw = required(event, name, operation)?;
    raw.trim().parse::<f64>().map_err(|e| EngineError::Rejected {
        operation,
        message: format!("{} parameter {name}={raw:?} is not numeric: {e}", event.event_type),
    })
}

/// Build the allocation for the current stub round.
fn allocate(state: &StubState) -> (Vec<ZoneAllocation>, Vec<Dispatch>, f64) {
    let served = UNITS_PER_ROUND * f64::from(state.round);
    let mut zones = Vec::with_capacity(state.zones.len());
    let mut dispatches = Vec::new();
    let mut remaining = 0.0;

    for zone in &state.zones {
        let need = zone.demand.mul_add(state.severity_factor, state.penalty);
        let unserved = (need - served).max(0.0);
        remaining += unserved;

        let primary = HospitalId::from(PRIMARY_HOSPITAL);
        let ground = if state.closed_routes.contains(&(primary.clone(), zone.zone_id.clone())) {
            HospitalId::from(BACKUP_HOSPITAL)
        } else {
            primary
        };

        let mut assigned = vec![assignment(&ground, "ambulance", state.round)];
        if zone.demand >= AIR_SUPPORT_THRESHOLD {
            assigned.push(assignment(&HospitalId::from(BACKUP_HOSPITAL), "helicopter", 1));
        }

        let mut summary: BTreeMap<String, u32> = BTreeMap::new();
        for entry in &assigned {
            for (resource, units) in &entry.resource_breakdown {
                let units = units.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0);
                let total = summary.entry(resource.clone()).or_insert(0);
                *total = total.saturating_add(units);
            }
            dispatches.push(Dispatch(serde_json::json!({
                "hospital": entry.hospital,
                "zone": zone.zone_id,
                "resources": entry.resource_breakdown,
            })));
        }

        zones.push(ZoneAllocation {
            zone_id: zone.zone_id.clone(),
            priority: priority_for(unserved),
            resource_summary: Some(
                summary
                    .into_iter()
                    .map(|(resource, units)| (resource, Number::from(units)))
                    .collect(),
            ),
            assigned_resources: assigned,
            confidence: Number::from_f64(if state.closed_routes.is_empty() { 0.9 } else { 0.7 }),
            unserved: Number::from_f64(unserved),
            extra: BTreeMap::new(),
        });
    }

    (zones, dispatches, remaining)
}

fn assignment(hospital: &HospitalId, resource: &str, units: u32) -> AssignedResource {
    AssignedResource {
        hospital: hospital.clone(),
        resource_breakdown: BTreeMap::from([(resource.to_owned(), Number::from(units))]),
        extra: BTreeMap::new(),
    }
}

fn priority_for(unserved: f64) -> Priority {
    if unserved >= AIR_SUPPORT_THRESHOLD {
        Priority::High
    } else if unserved > 0.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}
