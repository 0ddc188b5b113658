//! Static registry of perturbation event kinds.
//!
//! Each kind carries a human description and the ordered list of
//! parameters an operator must fill in before the event can be staged.
//! Validation is presence-only: value types and ranges are the engine's
//! concern, and a bad value comes back as an engine failure.

use std::collections::BTreeMap;

use relief_types::EventKind;
use serde::Serialize;

use crate::error::SimulationError;

/// Description of one registered event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventDescriptor {
    /// The kind this descriptor describes.
    pub kind: EventKind,
    /// One-line explanation shown to the operator.
    pub description: &'static str,
    /// Required parameter names, in input order.
    pub params: &'static [&'static str],
}

impl EventDescriptor {
    /// Display label, e.g. `road collapse`.
    pub fn label(&self) -> String {
        self.kind.as_str().replace('_', " ")
    }
}

static ROAD_COLLAPSE: EventDescriptor = EventDescriptor {
    kind: EventKind::RoadCollapse,
    description: "A road between a resource and zone has collapsed",
    params: &["hospital_id", "zone_id"],
};

static BRIDGE_OUT: EventDescriptor = EventDescriptor {
    kind: EventKind::BridgeOut,
    description: "A bridge between a resource and zone is out",
    params: &["hospital_id", "zone_id"],
};

static WEATHER: EventDescriptor = EventDescriptor {
    kind: EventKind::Weather,
    description: "Severe weather conditions affecting all routes",
    params: &["penalty"],
};

static FLOOD: EventDescriptor = EventDescriptor {
    kind: EventKind::Flood,
    description: "Flooding affecting route accessibility",
    params: &["severity_factor"],
};

static REGISTRY: [&EventDescriptor; 4] = [&ROAD_COLLAPSE, &BRIDGE_OUT, &WEATHER, &FLOOD];

/// Read-only, process-wide event catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCatalog;

impl EventCatalog {
    /// All registered descriptors, in registry order.
    pub fn kinds() -> impl Iterator<Item = &'static EventDescriptor> {
        REGISTRY.iter().copied()
    }

    /// The descriptor for a known kind.
    pub fn descriptor(kind: EventKind) -> &'static EventDescriptor {
        match kind {
            EventKind::RoadCollapse => &ROAD_COLLAPSE,
            EventKind::BridgeOut => &BRIDGE_OUT,
            EventKind::Weather => &WEATHER,
            EventKind::Flood => &FLOOD,
        }
    }

    /// Look up a kind by its wire name.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownEventKind`] if `name` is not registered.
    pub fn describe(name: &str) -> Result<&'static EventDescriptor, SimulationError> {
        EventKind::from_name(name)
            .map(Self::descriptor)
            .ok_or_else(|| SimulationError::UnknownEventKind(name.to_owned()))
    }

    /// Check that every required parameter of `kind` has a non-blank value.
    ///
    /// Extra keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::MissingParameter`] naming the first
    /// missing parameter in descriptor order.
    pub fn validate(
        kind: EventKind,
        params: &BTreeMap<String, String>,
    ) -> Result<(), SimulationError> {
        let descriptor = Self::descriptor(kind);
        let missing = descriptor.params.iter().find(|name| {
            params
                .get(**name)
                .is_none_or(|value| value.trim().is_empty())
        });

        match missing.copied() {
            Some(name) => Err(SimulationError::MissingParameter { kind, name }),
            None => Ok(()),
        }
    }
}
