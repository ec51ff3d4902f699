use std::sync::Arc;
use tokio::sync::broadcast;

use crate::atx::AtxController;
use crate::redfish::BootStore;

/// Application-wide state shared across handlers
///
/// Holds the single long-lived controller and boot override store; handlers
/// receive it through axum's `State` extractor.
pub struct AppState {
    /// ATX controller bound to the detected board
    pub atx: AtxController,
    /// Boot source override (in-memory)
    pub boot: BootStore,
    /// Shutdown signal sender
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        atx: AtxController,
        boot: BootStore,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Arc<Self> {
        Arc::new(Self {
            atx,
            boot,
            shutdown_tx,
        })
    }

    /// Subscribe to shutdown signal
    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }
}
