//! Allocation shapes produced by the engine.
//!
//! The console never computes these; it records and projects them. Fields
//! the engine sends beyond the ones named here are kept in `extra` so a
//! recorded snapshot round-trips unmodified.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use ts_rs::TS;

use crate::ids::{HospitalId, ZoneId};

/// Triage priority the engine assigns to a zone.
///
/// Variant order is display order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    /// Most urgent zones.
    High,
    /// Zones served after the urgent ones.
    Medium,
    /// Zones with little or no outstanding need.
    Low,
}

/// Resources one hospital sends to one zone in a single assignment entry.
///
/// Counts keep the engine's own numeric form (`2` stays `2`, `2.0` stays
/// `2.0`); readers go through [`AssignedResource::units`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AssignedResource {
    /// The contributing hospital.
    pub hospital: HospitalId,
    /// Units per resource type (e.g. `ambulance -> 3`).
    #[serde(default)]
    #[ts(type = "Record<string, number>")]
    pub resource_breakdown: BTreeMap<String, Number>,
    /// Engine fields not interpreted by the console.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl AssignedResource {
    /// Units per resource type as floats, in resource-name order.
    pub fn units(&self) -> impl Iterator<Item = (&str, f64)> {
        self.resource_breakdown
            .iter()
            .map(|(resource, count)| (resource.as_str(), count.as_f64().unwrap_or(0.0)))
    }
}

/// The allocation state of one zone in one round.
///
/// Recorded as the engine sent it: optional fields the engine omitted (or
/// sent as `null`) stay absent and numbers keep their original form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ZoneAllocation {
    /// The zone.
    pub zone_id: ZoneId,
    /// Engine-assigned triage priority.
    pub priority: Priority,
    /// Total units per resource type allocated to the zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "Record<string, number> | null")]
    pub resource_summary: Option<BTreeMap<String, Number>>,
    /// Per-hospital assignment entries. A hospital may appear more than once.
    #[serde(default)]
    pub assigned_resources: Vec<AssignedResource>,
    /// Engine confidence in the allocation, nominally `0..=1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub confidence: Option<Number>,
    /// Demand left unserved in this zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub unserved: Option<Number>,
    /// Engine fields not interpreted by the console.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ZoneAllocation {
    /// Confidence as a float, if the engine reported one.
    pub fn confidence(&self) -> Option<f64> {
        self.confidence.as_ref().and_then(Number::as_f64)
    }

    /// Unserved demand as a float, if the engine reported it.
    pub fn unserved(&self) -> Option<f64> {
        self.unserved.as_ref().and_then(Number::as_f64)
    }

    /// Resource summary as floats; empty when the engine sent none.
    pub fn resource_totals(&self) -> BTreeMap<String, f64> {
        self.resource_summary
            .iter()
            .flatten()
            .map(|(resource, count)| (resource.clone(), count.as_f64().unwrap_or(0.0)))
            .collect()
    }
}

/// One dispatch order reported by the engine for a round.
///
/// Opaque to the console; carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct Dispatch(pub serde_json::Value);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_high_first() {
        let mut priorities = vec![Priority::Low, Priority::High, Priority::Medium];
        priorities.sort();
        assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn unknown_zone_fields_are_preserved() {
        let raw = serde_json::json!({
            "zone_id": "Z1",
            "priority": "HIGH",
            "resource_summary": {"ambulance": 2},
            "assigned_resources": [
                {"hospital": "H1", "resource_breakdown": {"ambulance": 2}, "eta_minutes": 14}
            ],
            "confidence": 0.8,
            "unserved": 0,
            "population": 1200
        });
        let zone: Result<ZoneAllocation, _> = serde_json::from_value(raw.clone());
        assert!(zone.is_ok());
        if let Ok(zone) = zone {
            assert_eq!(zone.priority, Priority::High);
            assert_eq!(zone.extra.get("population"), Some(&serde_json::json!(1200)));
            let back = serde_json::to_value(&zone).unwrap_or_default();
            assert_eq!(
                back.pointer("/assigned_resources/0/eta_minutes"),
                Some(&serde_json::json!(14))
            );
            assert_eq!(back.get("population"), Some(&serde_json::json!(1200)));
        }
    }

    #[test]
    fn numbers_and_absent_fields_round_trip_unchanged() {
        let raw = serde_json::json!({
            "zone_id": "Z1",
            "priority": "LOW",
            "assigned_resources": [
                {"hospital": "H1", "resource_breakdown": {"ambulance": 2.0, "helicopter": 1}}
            ],
            "confidence": 1,
            "unserved": 0
        });
        let zone: Result<ZoneAllocation, _> = serde_json::from_value(raw.clone());
        assert!(zone.is_ok());
        if let Ok(zone) = zone {
            assert_eq!(zone.confidence(), Some(1.0));
            assert!(zone.resource_summary.is_none());
            assert_eq!(serde_json::to_value(&zone).unwrap_or_default(), raw);
        }
    }

    #[test]
    fn null_confidence_and_float_counts_decode() {
        let raw = serde_json::json!({
            "zone_id": "Z2",
            "priority": "HIGH",
            "resource_summary": {"ambulance": 2.5},
            "assigned_resources": [
                {"hospital": "H2", "resource_breakdown": {"ambulance": 2.5}}
            ],
            "confidence": null,
            "unserved": null
        });
        let zone: Result<ZoneAllocation, _> = serde_json::from_value(raw);
        assert!(zone.is_ok());
        if let Ok(zone) = zone {
            assert_eq!(zone.confidence(), None);
            assert_eq!(zone.unserved(), None);
            assert_eq!(zone.resource_totals().get("ambulance"), Some(&2.5));
            let units: Vec<(&str, f64)> = zone
                .assigned_resources
                .iter()
                .flat_map(AssignedResource::units)
                .collect();
            assert_eq!(units, vec![("ambulance", 2.5)]);
        }
    }
}
