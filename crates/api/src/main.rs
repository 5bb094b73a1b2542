use std::sync::Arc;

use anyhow::Result;
use api::{build_router, ApiState};
use axum::Router;
use common::{config::AppConfig, logging};
use db::pg::PgDatabase;
use db::Repositories;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let database = Arc::new(
        PgDatabase::connect(&config.database.url, config.database.max_connections).await?,
    );
    let repositories: Arc<dyn Repositories> = database;
    let state = Arc::new(ApiState {
        repositories,
        list_order: config.events.list_order,
        max_payload_bytes: config.api.max_payload_bytes,
        metrics_path: config.observability.metrics_path.clone(),
    });
    let app: Router = build_router(state);

    let addr: std::net::SocketAddr = config.api.bind.parse()?;
    info!(
        %addr,
        list_order = ?config.events.list_order,
        "webhook receiver listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
