//! Shared type definitions for the Relief allocation console.
//!
//! This crate is the single source of truth for the shapes exchanged with
//! the allocation engine and recorded in round history. Types defined here
//! flow downstream to `TypeScript` via `ts-rs` for the operator dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Session UUIDs and engine-assigned zone/hospital labels
//! - [`events`] -- Event kinds and the staged event payload
//! - [`scenario`] -- Scenario description submitted at simulation start
//! - [`allocation`] -- Zone allocation and dispatch shapes
//! - [`round`] -- Engine round responses and the immutable round record

pub mod allocation;
pub mod events;
pub mod ids;
pub mod round;
pub mod scenario;

// Re-export all public types at crate root for convenience.
pub use allocation::{AssignedResource, Dispatch, Priority, ZoneAllocation};
pub use events::{EventKind, StagedEvent};
pub use ids::{HospitalId, SessionId, ZoneId};
pub use round::{NextRoundResponse, RoundRecord, StartRoundResponse};
pub use scenario::{DisasterType, Scenario, ZoneDemand};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Calling export_all writes each binding into `bindings/`
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::SessionId::export_all();
        let _ = crate::ids::ZoneId::export_all();
        let _ = crate::ids::HospitalId::export_all();

        // Events and scenario
        let _ = crate::events::EventKind::export_all();
        let _ = crate::events::StagedEvent::export_all();
        let _ = crate::scenario::DisasterType::export_all();
        let _ = crate::scenario::ZoneDemand::export_all();
        let _ = crate::scenario::Scenario::export_all();

        // Allocation
        let _ = crate::allocation::Priority::export_all();
        let _ = crate::allocation::AssignedResource::export_all();
        let _ = crate::allocation::ZoneAllocation::export_all();
        let _ = crate::allocation::Dispatch::export_all();

        // Rounds
        let _ = crate::round::StartRoundResponse::export_all();
        let _ = crate::round::NextRoundResponse::export_all();
        let _ = crate::round::RoundRecord::export_all();
    }
}
