//! REST API handlers for the operator console.
//!
//! Every handler is a thin adapter over the current [`SimulationSession`];
//! the session owns validation, single-flight guarding, and history.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/catalog` | Registered event kinds |
//! | `POST` | `/api/simulation/start` | Start the simulation (once) |
//! | `POST` | `/api/simulation/reset` | Replace the session with a fresh one |
//! | `GET` | `/api/events` | Staged events |
//! | `POST` | `/api/events` | Stage an event |
//! | `DELETE` | `/api/events/{index}` | Discard a staged event |
//! | `POST` | `/api/rounds/next` | Submit staged events, record next round |
//! | `GET` | `/api/rounds` | Round history summaries |
//! | `POST` | `/api/rounds/{n}/select` | Show round `n` |
//! | `GET` | `/api/view` | Projection of the selected round |
//! | `GET` | `/api/status` | Session status |
//!
//! [`SimulationSession`]: relief_core::SimulationSession

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use relief_core::{EventCatalog, RoundView, SessionStatus};
use relief_types::{EventKind, RoundRecord, Scenario, StagedEvent};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::{AppState, ConsoleSession};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One entry of `GET /api/catalog`.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    /// Wire name of the kind.
    pub kind: EventKind,
    /// Display label, e.g. `road collapse`.
    pub label: String,
    /// Human-readable description.
    pub description: &'static str,
    /// Required parameter names.
    pub params: &'static [&'static str],
}

/// Response body for `POST /api/simulation/start`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartResponse {
    /// Round 1 was recorded.
    Started {
        /// The recorded round.
        round: Box<RoundRecord>,
    },
    /// A start had already been issued; nothing changed.
    AlreadyStarted,
}

/// Request body for `POST /api/events`.
#[derive(Debug, Deserialize)]
pub struct StageEventRequest {
    /// Event kind name, e.g. `road_collapse`.
    pub event_type: String,
    /// Parameter values keyed by name.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// One entry of `GET /api/rounds`.
#[derive(Debug, Serialize)]
pub struct RoundSummary {
    /// Round number.
    pub round_number: u32,
    /// Total unserved demand after the round.
    pub remaining_demand: f64,
    /// Zones in the allocation snapshot.
    pub zones: usize,
    /// Events submitted for the round.
    pub events: usize,
    /// Whether the engine fell back to its heuristic path.
    pub fallback_used: bool,
    /// Whether this round is the one being shown.
    pub selected: bool,
    /// When the round was recorded.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// List every registered event kind in registry order.
pub async fn list_catalog() -> impl IntoResponse {
    let entries: Vec<CatalogEntry> = EventCatalog::kinds()
        .map(|descriptor| CatalogEntry {
            kind: descriptor.kind,
            label: descriptor.label(),
            description: descriptor.description,
            params: descriptor.params,
        })
        .collect();
    Json(entries)
}

// ---------------------------------------------------------------------------
// Simulation lifecycle
// ---------------------------------------------------------------------------

/// Start the simulation. Repeated starts answer `already_started`.
pub async fn start_simulation(
    State(state): State<Arc<AppState>>,
    Json(scenario): Json<Scenario>,
) -> Result<impl IntoResponse, ApiError> {
    let response = match state.session().await.start(&scenario).await? {
        Some(record) => StartResponse::Started {
            round: Box::new(RoundRecord::clone(&record)),
        },
        None => StartResponse::AlreadyStarted,
    };
    Ok(Json(response))
}

/// Discard the current session and begin a fresh one. Returns its status.
///
/// This is the way out after a failed start, which leaves the start latch
/// set.
pub async fn reset_simulation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionStatus>, ApiError> {
    let session = state.reset().await?;
    Ok(Json(session.status().await))
}

// ---------------------------------------------------------------------------
// Draft events
// ---------------------------------------------------------------------------

/// The staged events in staging order.
pub async fn list_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session().await.staged_events().await)
}

/// Validate and stage one event.
pub async fn stage_event(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StageEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event: StagedEvent = state
        .session()
        .await
        .stage_event(&request.event_type, request.params)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Discard the staged event at `index`.
pub async fn discard_event(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.session().await.discard_event(index).await?;
    Ok(Json(event))
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// Submit all staged events and record the next round.
pub async fn next_round(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let record = state.session().await.submit_round().await?;
    info!(
        round = record.round_number,
        events = record.submitted_events.len(),
        "round submitted"
    );
    Ok(Json(RoundRecord::clone(&record)))
}

/// Summaries of every recorded round.
pub async fn list_rounds(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let history = state.session().await.state().await;
    let current = history.current_step();
    let summaries: Vec<RoundSummary> = history
        .rounds()
        .iter()
        .map(|record| RoundSummary {
            round_number: record.round_number,
            remaining_demand: record.remaining_demand,
            zones: record.allocation_snapshot.len(),
            events: record.submitted_events.len(),
            fallback_used: record.fallback_used,
            selected: record.round_number == current,
            recorded_at: record.recorded_at,
        })
        .collect();
    Json(summaries)
}

/// Show round `n` and return its projection.
pub async fn select_round(
    State(state): State<Arc<AppState>>,
    Path(n): Path<u32>,
) -> Result<Json<RoundView>, ApiError> {
    let session = state.session().await;
    session.select_round(n).await?;
    current_view(&session).await
}

/// Projection of the selected round.
pub async fn get_view(State(state): State<Arc<AppState>>) -> Result<Json<RoundView>, ApiError> {
    let session = state.session().await;
    current_view(&session).await
}

async fn current_view(session: &ConsoleSession) -> Result<Json<RoundView>, ApiError> {
    session
        .view()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no rounds recorded".to_owned()))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Session status summary.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.session().await.status().await)
}
