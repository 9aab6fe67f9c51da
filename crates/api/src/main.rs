use anyhow::Context;
use tracing::info;

use stockdesk_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockdesk_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(?config, "starting stockdesk-api");

    let services = stockdesk_api::app::services::build_services(&config).await?;
    let app = stockdesk_api::app::build_app(&config, services)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
