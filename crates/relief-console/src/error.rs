//! Error types for the operator API.
//!
//! [`ApiError`] wraps controller failures and converts them into Axum
//! HTTP responses via its [`IntoResponse`] implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relief_core::SimulationError;
use relief_engine::BackendError;
use tracing::warn;

/// Errors that can occur in the operator API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A controller operation failed.
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A fresh engine backend could not be built.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Simulation(e) => match e {
                SimulationError::MissingParameter { .. } => StatusCode::BAD_REQUEST,
                SimulationError::UnknownEventKind(_)
                | SimulationError::StagedEventNotFound { .. }
                | SimulationError::RoundOutOfRange { .. } => StatusCode::NOT_FOUND,
                SimulationError::RoundInFlight | SimulationError::NotStarted => {
                    StatusCode::CONFLICT
                }
                SimulationError::EngineFailure(_) => StatusCode::BAD_GATEWAY,
                SimulationError::NonMonotonicRound { .. } | SimulationError::ArithmeticOverflow => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
