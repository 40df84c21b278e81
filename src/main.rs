use std::sync::Arc;

use anyhow::Context;
use discovery_front::{
    create_router,
    services::{upstream::HttpDiscoveryApi, FileStorage},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env()?;

    let api = Arc::new(
        HttpDiscoveryApi::new(&config.api_base_url, config.request_timeout())
            .context("failed to build API client")?,
    );
    let storage = Arc::new(FileStorage::new(config.session_file.clone()));

    // Initialize application state
    let state = AppState::new(
        api,
        storage,
        config.recommendation_sample_size,
        config.suggestion_debounce(),
    );

    let browser = state.browser.clone();

    // Create the router with all routes
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(%address, api = %config.api_base_url, "Server running");
    // Closing the browser resolves catalog queries still waiting on the API,
    // so the drain does not wait for a slow upstream
    let shutdown = async move {
        wait_for_shutdown().await;
        browser.close();
        tracing::info!("Shutting down gracefully");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
