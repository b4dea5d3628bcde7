use std::sync::Arc;

use anyhow::Context;

use stationflow_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stationflow_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let services = Arc::new(
        app::services::build_services(&config)
            .await
            .context("failed to initialize transfer store")?,
    );

    let app = app::build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    services.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
