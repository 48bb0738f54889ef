// BIN Lookup Demo - Web Server
// REST API with Axum, backed by the in-memory mock catalog

use anyhow::{Context, Result};
use bin_lookup_demo::api::{router, AppState};
use bin_lookup_demo::{init_tracing, DemoConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");

    let config = DemoConfig::from_env().context("Invalid environment configuration")?;
    let catalog = config.load_catalog().context("Failed to load BIN catalog")?;

    tracing::info!(
        latency = config.latency.enabled,
        unknown_bins = ?config.unknown_bins,
        ranges = catalog.ranges().len(),
        "demo mode: serving mock data"
    );
    for bin in catalog.sample_bins() {
        if let Some(record) = catalog.get(bin) {
            tracing::info!("sample BIN {} - {} ({})", bin, record.issuer_name, record.country_code);
        }
    }

    let addr = config.bind_addr();
    let app = router(AppState::new(catalog, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
