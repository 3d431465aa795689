mod chain;
mod config;
mod insights;
mod models;
mod orchestrator;
mod polling;
mod providers;
mod routes;
mod telemetry;

use anyhow::Context;
use routes::AppState;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tracing_subscriber::{fmt, EnvFilter};
use tower_http::cors::{CorsLayer, Any};

use crate::{config::Config, orchestrator::Orchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        groq = config.groq.api_key.is_some(),
        openai = config.openai.api_key.is_some(),
        replicate = config.replicate.api_key.is_some(),
        telemetry = config.telemetry.is_some(),
        poll_ceiling_secs = config.poll.ceiling().as_secs(),
        "Providers configured"
    );

    let state = AppState {
        orchestrator: Orchestrator::from_config(&config),
    };

    let app = routes::router(state).layer(
        ServiceBuilder::new().layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
    );

    let addr = SocketAddr::from(([0,0,0,0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
