//! HTTP Server
//!
//! Binds the axum router on TCP and serves it until stopped.

use crate::handler;
use axum::routing::{get, put};
use axum::Router;
use cgsg_core::application::{ContentService, MaintenanceAdminService};
use cgsg_core::port::{ChangeFeed, IdentityProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8787;

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16, // 0 = ephemeral
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub maintenance: Arc<MaintenanceAdminService>,
    pub content: Arc<ContentService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub feed: Arc<dyn ChangeFeed>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(
        maintenance: Arc<MaintenanceAdminService>,
        content: Arc<ContentService>,
        identity: Arc<dyn IdentityProvider>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            maintenance,
            content,
            identity,
            feed,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Resolves to `true` once the server starts shutting down
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// End open change streams so graceful shutdown can drain connections
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

/// Build the router with every route and the trace layer
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handler::health))
        .route("/api/maintenance/events", get(handler::change_events))
        .route("/api/maintenance/{key}", get(handler::get_status))
        .route("/api/admin/maintenance", get(handler::list_maintenance))
        .route(
            "/api/admin/maintenance/{key}",
            put(handler::set_maintenance).delete(handler::clear_maintenance),
        )
        .route("/api/admin/{component}", get(handler::list_items))
        .route(
            "/api/admin/{component}/{id}",
            get(handler::get_item)
                .put(handler::put_item)
                .delete(handler::delete_item),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind and start serving in a background task
    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind HTTP server on {}: {}", addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| format!("Failed to read local address: {}", e))?;

        info!(addr = %local_addr, "HTTP server listening");

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let state = self.state.clone();
        let app = router(self.state);

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.await;
                    state.begin_shutdown();
                })
                .await
        });

        Ok(ServerHandle {
            local_addr,
            stop_tx,
            task,
        })
    }
}

/// Running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL for clients, e.g. `http://127.0.0.1:8787`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn stop(self) -> Result<(), String> {
        let _ = self.stop_tx.send(());
        match self.task.await {
            Ok(result) => result.map_err(|e| format!("HTTP server error: {}", e)),
            Err(e) => Err(format!("HTTP server task failed: {}", e)),
        }
    }
}
