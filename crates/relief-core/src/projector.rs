//! Read-only projection of the selected round for presentation.
//!
//! Everything here is a pure function of [`SimulationState`]. Nothing is
//! cached: snapshots are immutable once recorded and the projection is
//! linear in the number of assignment entries.

use std::collections::BTreeMap;

use relief_types::{Dispatch, HospitalId, Priority, RoundRecord, ZoneAllocation, ZoneId};
use serde::Serialize;

use crate::history::SimulationState;

/// Units per `hospital -> zone -> resource type`.
pub type HospitalDispatch = BTreeMap<HospitalId, BTreeMap<ZoneId, BTreeMap<String, f64>>>;

/// One row of a zone's allocation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRow {
    /// Contributing hospital.
    pub hospital: HospitalId,
    /// Resource type, e.g. `ambulance`.
    pub resource_type: String,
    /// Units sent.
    pub units: f64,
}

/// A zone as shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneView {
    /// The zone.
    pub zone_id: ZoneId,
    /// Engine-assigned priority.
    pub priority: Priority,
    /// Units per resource type allocated to the zone; empty when the
    /// engine reported no summary.
    pub resource_summary: BTreeMap<String, f64>,
    /// Allocation table rows in assignment order.
    pub rows: Vec<AllocationRow>,
    /// Engine confidence as a whole percentage, if reported.
    pub confidence_pct: Option<u32>,
    /// Demand left unserved, if reported.
    pub unserved: Option<f64>,
}

/// The engine's narrative for a round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Agent reasoning when present, otherwise the solver's round reasoning.
    pub reasoning: String,
    /// Events the engine reports as applied.
    pub events_applied: Option<serde_json::Value>,
    /// Whether the engine fell back to its heuristic path.
    pub fallback_used: bool,
}

/// Everything the operator sees for the selected round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundView {
    /// The round being shown.
    pub round_number: u32,
    /// The newest recorded round.
    pub latest_round: u32,
    /// Whether the shown round is the newest one.
    pub is_latest: bool,
    /// Zones sorted by priority, highest first.
    pub zones: Vec<ZoneView>,
    /// Per-hospital dispatch plan.
    pub hospital_dispatch: HospitalDispatch,
    /// Engine narrative.
    pub assessment: Assessment,
    /// Total demand left unserved.
    pub remaining_demand: f64,
    /// Dispatch orders, verbatim.
    pub dispatches: Vec<Dispatch>,
}

/// Project the selected round, or `None` if nothing has been recorded.
pub fn project(state: &SimulationState) -> Option<RoundView> {
    let record = state.current()?;
    let latest_round = state.len();
    Some(project_round(record, latest_round))
}

/// Project a specific round record.
pub fn project_round(record: &RoundRecord, latest_round: u32) -> RoundView {
    RoundView {
        round_number: record.round_number,
        latest_round,
        is_latest: record.round_number == latest_round,
        zones: zone_views(&record.allocation_snapshot),
        hospital_dispatch: hospital_dispatch(&record.allocation_snapshot),
        assessment: Assessment {
            reasoning: record
                .agent_reasoning
                .clone()
                .unwrap_or_else(|| record.reasoning.clone()),
            events_applied: record.events_applied.clone(),
            fallback_used: record.fallback_used,
        },
        remaining_demand: record.remaining_demand,
        dispatches: record.dispatches.clone(),
    }
}

/// Group assignment entries by hospital, then zone, then resource type.
///
/// Counts for a repeated hospital/zone/resource combination are summed.
pub fn hospital_dispatch(snapshot: &[ZoneAllocation]) -> HospitalDispatch {
    let mut dispatch = HospitalDispatch::new();

    for zone in snapshot {
        for entry in &zone.assigned_resources {
            let per_zone = dispatch
                .entry(entry.hospital.clone())
                .or_default()
                .entry(zone.zone_id.clone())
                .or_default();

            for (resource_type, units) in entry.units() {
                *per_zone.entry(resource_type.to_owned()).or_insert(0.0) += units;
            }
        }
    }

    dispatch
}

/// Zones in display order: priority first, engine order within a priority.
pub fn zone_views(snapshot: &[ZoneAllocation]) -> Vec<ZoneView> {
    let mut zones: Vec<ZoneView> = snapshot.iter().map(zone_view).collect();
    zones.sort_by_key(|zone| zone.priority);
    zones
}

fn zone_view(zone: &ZoneAllocation) -> ZoneView {
    let rows = zone
        .assigned_resources
        .iter()
        .flat_map(|entry| {
            entry.units().map(|(resource_type, units)| AllocationRow {
                hospital: entry.hospital.clone(),
                resource_type: resource_type.to_owned(),
                units,
            })
        })
        .collect();

    ZoneView {
        zone_id: zone.zone_id.clone(),
        priority: zone.priority,
        resource_summary: zone.resource_totals(),
        rows,
        confidence_pct: zone.confidence().map(confidence_pct),
        unserved: zone.unserved(),
    }
}

/// `0.873 -> 87`, clamped to `0..=100`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn confidence_pct(confidence: f64) -> u32 {
    if confidence.is_nan() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}
