use std::sync::Arc;

use anyhow::Context;

use gridcat_api::app::{build_app, services::build_services};
use gridcat_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gridcat_observability::init_from_env();

    let config = AppConfig::from_env()?;
    let services = Arc::new(build_services(&config).await?);
    let app = build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutting down background workers");
    tokio::task::spawn_blocking(move || services.shutdown()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c; shutting down");
    }
}
