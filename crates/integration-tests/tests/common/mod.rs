//! Shared fixtures: file-backed SQLite and a running HTTP server

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cgsg_api_http::{AppState, HttpServer, HttpServerConfig, ServerHandle};
use cgsg_core::application::{ContentService, MaintenanceAdminService, ResolverSnapshot};
use cgsg_core::domain::Role;
use cgsg_core::port::time_provider::SystemTimeProvider;
use cgsg_infra_sqlite::{
    create_pool, run_migrations, BroadcastChangeFeed, SqliteContentRepository,
    SqliteIdentityProvider, SqliteMaintenanceRepository,
};
use sqlx::SqlitePool;
use tokio::sync::watch;

pub const ADMIN_TOKEN: &str = "it-admin-token";
pub const EDITOR_TOKEN: &str = "it-editor-token";

static DB_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Temp database file, removed on drop
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new(name: &str) -> Self {
        let seq = DB_SEQ.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "cgsg_it_{}_{}_{}.db",
            name,
            std::process::id(),
            seq
        ));
        let _ = std::fs::remove_file(&path);
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    pub async fn pool(&self) -> SqlitePool {
        let pool = create_pool(&self.url()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

/// Everything a server-side test needs
pub struct Stack {
    pub db: TempDb,
    pub pool: SqlitePool,
    pub feed: BroadcastChangeFeed,
    pub maintenance: Arc<MaintenanceAdminService>,
    pub identity: Arc<SqliteIdentityProvider>,
    pub state: AppState,
}

pub async fn stack(name: &str) -> Stack {
    let db = TempDb::new(name);
    let pool = db.pool().await;
    let time = Arc::new(SystemTimeProvider);
    let feed = BroadcastChangeFeed::default();

    let maintenance = Arc::new(MaintenanceAdminService::new(
        Arc::new(SqliteMaintenanceRepository::new(pool.clone(), feed.clone())),
        time.clone(),
    ));
    let content = Arc::new(ContentService::new(
        Arc::new(SqliteContentRepository::new(pool.clone())),
        time.clone(),
    ));
    let identity = Arc::new(SqliteIdentityProvider::new(pool.clone(), time));
    identity
        .issue_token(ADMIN_TOKEN, "ops", Role::Admin)
        .await
        .unwrap();
    identity
        .issue_token(EDITOR_TOKEN, "writer", Role::Editor)
        .await
        .unwrap();

    let state = AppState::new(
        maintenance.clone(),
        content,
        identity.clone(),
        Arc::new(feed.clone()),
    );

    Stack {
        db,
        pool,
        feed,
        maintenance,
        identity,
        state,
    }
}

/// Start the HTTP server on an ephemeral port
pub async fn serve(stack: &Stack) -> ServerHandle {
    HttpServer::new(
        HttpServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        stack.state.clone(),
    )
    .start()
    .await
    .unwrap()
}

/// Wait until a snapshot satisfies `predicate`, failing after `limit`
pub async fn wait_for<F>(
    updates: &mut watch::Receiver<ResolverSnapshot>,
    limit: Duration,
    predicate: F,
) -> ResolverSnapshot
where
    F: Fn(&ResolverSnapshot) -> bool,
{
    let snapshot = tokio::time::timeout(limit, updates.wait_for(|s| predicate(s)))
        .await
        .expect("timed out waiting for resolver snapshot")
        .expect("resolver stopped");
    snapshot.clone()
}
