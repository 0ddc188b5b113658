//! Perturbation event kinds and the staged event payload.
//!
//! An operator authors events between rounds; the engine applies them in
//! submission order when it computes the next allocation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A registered kind of perturbation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// A road between a resource and a zone has collapsed.
    RoadCollapse,
    /// A bridge between a resource and a zone is out.
    BridgeOut,
    /// Severe weather penalises every route.
    Weather,
    /// Flooding reduces route accessibility.
    Flood,
}

impl EventKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 4] = [Self::RoadCollapse, Self::BridgeOut, Self::Weather, Self::Flood];

    /// The wire name of this kind (e.g. `road_collapse`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoadCollapse => "road_collapse",
            Self::BridgeOut => "bridge_out",
            Self::Weather => "weather",
            Self::Flood => "flood",
        }
    }

    /// Look up a kind by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event the operator has confirmed for a future round.
///
/// This is also the wire shape sent to the engine: `{event_type, params}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StagedEvent {
    /// Which kind of perturbation this is.
    pub event_type: EventKind,
    /// Parameter values keyed by parameter name, collected as free text.
    pub params: BTreeMap<String, String>,
}
