use std::sync::Arc;

use anyhow::Context;
use common::storage::UploadStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pdfdesk::config::AppConfig;
use pdfdesk::database::init_db;
use pdfdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database ready");

    let uploads = UploadStore::new(
        config.storage.upload_dir.clone(),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to prepare upload directory")?;
    info!(upload_dir = %config.storage.upload_dir.display(), "Upload store ready");

    let addr = (config.server.host.clone(), config.server.port);
    let state = AppState {
        db,
        config: Arc::new(config),
        uploads: Arc::new(uploads),
    };
    let app = pdfdesk::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}:{}", addr.0, addr.1))?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
