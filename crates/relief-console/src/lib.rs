//! Operator console for the Relief round-based allocation simulation.
//!
//! This crate provides an Axum HTTP server exposing the simulation
//! controller as a REST API: browse the event catalog, start a scenario,
//! stage and discard events, advance rounds, browse history, and read the
//! projected view of the selected round.
//!
//! # Architecture
//!
//! ```text
//! dashboard ──HTTP──> router ──> handlers ──> SimulationSession ──> EngineBackend
//! ```
//!
//! One session is driven at a time. `POST /api/simulation/reset` replaces
//! it with a fresh session on a newly built engine backend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use config::{ConfigError, ConsoleConfig, LoggingConfig, ServerConfig};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AppState, ConsoleSession};
