//! Round-based simulation controller for the Relief allocation console.
//!
//! An operator starts a disaster scenario, inspects the resulting
//! allocation, stages perturbation events, and advances round by round.
//! This crate owns that state machine; rendering is a read-only observer
//! of the projections it produces.
//!
//! # Modules
//!
//! - [`catalog`] -- Static registry of event kinds and parameter validation.
//! - [`draft`] -- Ordered buffer of events staged for the next round.
//! - [`engine`] -- [`AllocationEngine`] trait and [`StubEngine`].
//! - [`error`] -- [`SimulationError`] taxonomy.
//! - [`executor`] -- Guarded start/advance transitions that record rounds.
//! - [`history`] -- Append-only round history with the selected step.
//! - [`projector`] -- Zone and hospital-dispatch views of the selected round.
//! - [`session`] -- [`SimulationSession`] composing all of the above.
//!
//! [`AllocationEngine`]: engine::AllocationEngine
//! [`StubEngine`]: engine::StubEngine
//! [`SimulationError`]: error::SimulationError
//! [`SimulationSession`]: session::SimulationSession

pub mod catalog;
pub mod draft;
pub mod engine;
pub mod error;
pub mod executor;
pub mod history;
pub mod projector;
pub mod session;

pub use catalog::{EventCatalog, EventDescriptor};
pub use engine::{AllocationEngine, EngineError, EngineOperation, StubEngine};
pub use error::SimulationError;
pub use history::SimulationState;
pub use projector::RoundView;
pub use session::{SessionStatus, SimulationSession};
