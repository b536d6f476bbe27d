//! HTTP server initialization and runtime setup.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::BizCodeRegistry;
use crate::routes::app_router;
use crate::state::AppState;
use crate::validation::{Locale, ValidationEngine};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

/// Builds the shared state: business-code catalog and validation engine.
///
/// # Panics
///
/// Panics if the catalog codes are already present in `registry`.
pub fn build_state(config: &Config, registry: &BizCodeRegistry) -> AppState {
    let catalog = Catalog::register(registry);
    tracing::info!(codes = registry.len(), "Business codes registered");

    let locale = Locale::resolve(&config.locale);
    let validation = Arc::new(ValidationEngine::builder(locale).build());
    tracing::info!(locale = %locale, "Validation engine ready");

    AppState::new(catalog, validation)
}

/// Runs the HTTP server with the given configuration.
///
/// Business codes go into the process-wide [`BizCodeRegistry::global`].
///
/// # Errors
///
/// Returns an error if:
/// - The listen address is invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config, BizCodeRegistry::global());
    let app = app_router(state, &config);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
