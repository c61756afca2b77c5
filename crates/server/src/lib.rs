//! FluxRadar HTTP server.
//!
//! Exposes the resource registry over `axum` + `tokio`:
//! - POST /data       - Replace one cluster's snapshot
//! - GET  /resources  - Full current snapshot (never cached)
//! - GET  /updates    - Server-sent "update" signal per registry change
//! - GET  /health     - Registry counters
//!
//! The same routes are also served under `/api` (`/api/data`, ...), the paths
//! in-cluster agents post to by default.

#![forbid(unsafe_code)]

mod error;
mod handlers;
pub mod live;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use fluxradar_store::Registry;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{IngestError, ServeError};
pub use handlers::EPOCH_HEADER;
pub use state::AppState;

/// Default request body limit: 10 MB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: SocketAddr::from(([0, 0, 0, 0], 8443)), max_body_bytes: DEFAULT_MAX_BODY_BYTES }
    }
}

fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/data", post(handlers::handle_ingest))
        .route("/resources", get(handlers::handle_resources))
        .route("/updates", get(handlers::handle_updates))
        .route("/health", get(handlers::handle_health))
}

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    // Permissive CORS: dashboards are commonly served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    routes()
        .nest("/api", routes())
        .fallback(handlers::handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
}

/// Bind `config.addr` and serve until Ctrl+C.
pub async fn serve(registry: Arc<Registry>, config: ServerConfig) -> Result<(), ServeError> {
    let state = Arc::new(AppState::new(registry));
    let app = router(Arc::clone(&state), &config);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|source| ServeError::Bind { addr: config.addr, source })?;
    let local = listener.local_addr().map_err(ServeError::Serve)?;
    info!(addr = %local, "FluxRadar listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            state.begin_shutdown();
        })
        .await
        .map_err(ServeError::Serve)?;
    info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler; running until killed");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}
