//! Axum router construction for the operator API.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled so the
//! dashboard can be served from another origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the console.
///
/// See [`handlers`] for the endpoint table.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/catalog", get(handlers::list_catalog))
        .route("/api/simulation/start", post(handlers::start_simulation))
        .route("/api/simulation/reset", post(handlers::reset_simulation))
        .route(
            "/api/events",
            get(handlers::list_events).post(handlers::stage_event),
        )
        .route("/api/events/{index}", delete(handlers::discard_event))
        .route("/api/rounds", get(handlers::list_rounds))
        .route("/api/rounds/next", post(handlers::next_round))
        .route("/api/rounds/{n}/select", post(handlers::select_round))
        .route("/api/view", get(handlers::get_view))
        .route("/api/status", get(handlers::get_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
