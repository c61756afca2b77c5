//! Application state shared across request handlers.

use std::sync::Arc;

use fluxradar_store::Registry;
use tokio::sync::watch;

pub struct AppState {
    pub(crate) registry: Arc<Registry>,
    /// Flipped to `true` once the server starts shutting down; live streams end on it.
    shutdown: watch::Sender<bool>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self { registry, shutdown }
    }

    pub fn registry(&self) -> &Arc<Registry> { &self.registry }

    pub(crate) fn shutdown_rx(&self) -> watch::Receiver<bool> { self.shutdown.subscribe() }

    /// End every open live-update stream so graceful shutdown can complete.
    pub fn begin_shutdown(&self) { self.shutdown.send_replace(true); }
}
