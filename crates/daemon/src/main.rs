//! CGSG Server - Main Entry Point
//! HTTP API over the SQLite maintenance store

mod logging;
mod settings;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use cgsg_api_http::{AppState, HttpServer, HttpServerConfig};
use cgsg_core::application::{ContentService, MaintenanceAdminService};
use cgsg_core::domain::Role;
use cgsg_core::port::time_provider::SystemTimeProvider;
use cgsg_core::VERSION;
use cgsg_infra_sqlite::{
    create_pool, run_migrations, BroadcastChangeFeed, SqliteContentRepository,
    SqliteIdentityProvider, SqliteMaintenanceRepository,
};
use settings::ServerConfig;

const SEED_ADMIN_USER: &str = "admin";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = ServerConfig::load().context("Failed to load configuration")?;

    // 2. Initialize logging
    let _logging = logging::init(config.log_format, config.log_dir().as_deref())?;

    info!("CGSG server v{} starting...", VERSION);

    // 3. Initialize database
    if let Some(dir) = config.database_dir() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create database dir {}", dir.display()))?;
    }
    let database_url = config.database_url();
    info!(database_url = %database_url, "Initializing database...");

    let pool = create_pool(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let feed = BroadcastChangeFeed::default();

    let maintenance_repo = Arc::new(SqliteMaintenanceRepository::new(pool.clone(), feed.clone()));
    let content_repo = Arc::new(SqliteContentRepository::new(pool.clone()));
    let identity = Arc::new(SqliteIdentityProvider::new(pool.clone(), time_provider.clone()));

    // 5. Seed admin token
    if let Some(token) = config.admin_token.as_deref() {
        identity
            .issue_token(token, SEED_ADMIN_USER, Role::Admin)
            .await
            .map_err(|e| anyhow::anyhow!("Admin token seeding failed: {}", e))?;
    }

    let state = AppState::new(
        Arc::new(MaintenanceAdminService::new(maintenance_repo, time_provider.clone())),
        Arc::new(ContentService::new(content_repo, time_provider)),
        identity,
        Arc::new(feed),
    );

    // 6. Start HTTP server
    let server = HttpServer::new(
        HttpServerConfig {
            host: config.host.clone(),
            port: config.port,
        },
        state,
    );
    let handle = server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server start failed: {}", e))?;

    info!(url = %handle.base_url(), "System ready");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    handle
        .stop()
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server stop failed: {}", e))?;
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}
