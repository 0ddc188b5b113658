//! Operator console binary for the Relief allocation simulation.
//!
//! # Startup Sequence
//!
//! 1. Resolve the config path (first argument, `RELIEF_CONFIG`, or default)
//! 2. Load configuration with environment overrides
//! 3. Initialize structured logging (tracing)
//! 4. Create the engine backend
//! 5. Serve the operator API until `Ctrl-C`

use std::sync::Arc;

use anyhow::Context;
use relief_console::config::{self, ConsoleConfig, LoggingConfig};
use relief_console::{AppState, start_server};
use relief_core::AllocationEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, backend construction, or the server
/// fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = config::resolve_path(
        std::env::args().nth(1),
        std::env::var("RELIEF_CONFIG").ok(),
    );
    let config = ConsoleConfig::load(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    init_tracing(&config.logging);
    info!(
        config = %path.display(),
        backend = ?config.engine.backend,
        engine_url = config.engine.base_url,
        request_timeout_ms = config.engine.request_timeout_ms,
        "relief-console starting"
    );

    let state = Arc::new(AppState::new(config.engine.clone()).context("creating engine backend")?);
    {
        let session = state.session().await;
        info!(
            session = %session.id(),
            engine = session.engine().name(),
            "simulation session created"
        );
    }

    start_server(&config.server, state).await?;
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
