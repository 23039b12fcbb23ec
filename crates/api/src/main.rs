//! InfluLink - influencer identity linking and statistics service
//!
//! Main entry point for the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use influlink_api::utils::logging::init_tracing;
use influlink_api::{build_router, AppContext};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = influlink_infra::config::load().context("loading configuration")?;
    init_tracing(&config.logging);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.server.host, config.server.port))?;

    let ctx = Arc::new(AppContext::new(config).context("initializing application context")?);
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    info!(%addr, "InfluLink listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("InfluLink stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for ctrl-c");
    }
}
