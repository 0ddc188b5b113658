//! HTTP client for the remote allocation engine.
//!
//! Two JSON endpoints, both `POST`:
//!
//! - `{base_url}/optimize` takes a [`Scenario`] and answers with a
//!   [`StartRoundResponse`];
//! - `{base_url}/next-round` takes `{"events": [...]}` and answers with a
//!   [`NextRoundResponse`].
//!
//! A non-success status is surfaced with the response body text so the
//! operator sees the engine's own explanation.

use relief_core::{AllocationEngine, EngineError, EngineOperation};
use relief_types::{NextRoundResponse, Scenario, StagedEvent, StartRoundResponse};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::BackendError;

/// Request body of the next-round endpoint.
#[derive(Debug, Serialize)]
struct NextRoundRequest<'a> {
    events: &'a [StagedEvent],
}

/// Allocation engine reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEngine {
    /// Build a client for the engine described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &EngineConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// POST `body` as JSON to `path` and decode the JSON reply.
    async fn post<B, R>(
        &self,
        operation: EngineOperation,
        path: &str,
        body: &B,
    ) -> Result<R, EngineError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(%operation, url = %url, "sending engine request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| EngineError::Transport {
                operation,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(EngineError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| EngineError::Transport {
            operation,
            message: e.to_string(),
        })?;
        debug!(%operation, bytes = bytes.len(), "engine response received");

        serde_json::from_slice(&bytes).map_err(|e| EngineError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

impl AllocationEngine for HttpEngine {
    async fn start_simulation(
        &self,
        scenario: &Scenario,
    ) -> Result<StartRoundResponse, EngineError> {
        self.post(EngineOperation::StartSimulation, "optimize", scenario)
            .await
    }

    async fn advance_round(

        &self,

        events: &[StagedEvent],

    ) -> Result<NextRoundResponse, EngineError> {
        self.post(
            EngineOperation::AdvanceRound,
            "next-round",
            &NextRoundRequest { events },
        )
        .await
    }

    fn name(&self) -> &str {
        "http"
    }
}
