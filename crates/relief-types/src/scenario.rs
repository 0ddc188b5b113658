//! Scenario description submitted when a simulation starts.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::events::StagedEvent;
use crate::ids::ZoneId;

/// The kind of disaster being simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DisasterType {
    /// Ground shaking with structural damage across zones.
    Earthquake,
    /// Riverine or coastal flooding.
    Flood,
}

/// A zone and the casualty demand the operator reports for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ZoneDemand {
    /// Zone identifier used by the engine.
    pub zone_id: ZoneId,
    /// Units of demand (casualties needing transport or care).
    pub demand: f64,
    /// Optional `[lat, lon]` of the zone centre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub coordinates: Option<[f64; 2]>,
}

/// The full request body for the engine's start operation.
///
/// Serialized exactly as the engine expects it:
/// `{disaster_type, coordinates, zones, events, use_agent}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Scenario {
    /// Earthquake or flood.
    pub disaster_type: DisasterType,
    /// Optional `[lat, lon]` of the disaster epicentre. Omitted from the
    /// request when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub coordinates: Option<[f64; 2]>,
    /// Zones with their reported demand.
    #[serde(default)]
    pub zones: Vec<ZoneDemand>,
    /// Events already known when the simulation starts.
    #[serde(default)]
    pub events: Vec<StagedEvent>,
    /// Whether the engine should run its reasoning agent on top of the solver.
    #[serde(default = "default_use_agent")]
    pub use_agent: bool,
}

const fn default_use_agent() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scenario_defaults() {
        let scenario: Result<Scenario, _> =
            serde_json::from_str(r#"{"disaster_type": "earthquake"}"#);
        assert!(scenario.is_ok());
        if let Ok(scenario) = scenario {
            assert!(scenario.use_agent);
            assert!(scenario.zones.is_empty());
            assert!(scenario.events.is_empty());
            assert!(scenario.coordinates.is_none());
        }
    }

    #[test]
    fn absent_coordinates_are_omitted_from_the_request() {
        let scenario = Scenario {
            disaster_type: DisasterType::Flood,
            coordinates: None,
            zones: vec![ZoneDemand {
                zone_id: ZoneId::from("Z1"),
                demand: 40.0,
                coordinates: None,
            }],
            events: Vec::new(),
            use_agent: false,
        };
        let body = serde_json::to_value(&scenario).unwrap_or_default();
        assert!(body.get("coordinates").is_none());
        assert!(body.pointer("/zones/0/coordinates").is_none());
        assert_eq!(body.get("disaster_type"), Some(&serde_json::json!("flood")));
    }

    #[test]
    fn unknown_disaster_type_rejected() {
        let scenario: Result<Scenario, _> = serde_json::from_str(r#"{"disaster_type": "tsunami"}"#);
        assert!(scenario.is_err());
    }
}
