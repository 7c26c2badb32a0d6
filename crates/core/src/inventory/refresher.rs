//! Periodic inventory refresh.
//!
//! Replaces the snapshot on a fixed schedule. After a failed refresh the
//! loop retries sooner, and the previous snapshot stays in service.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::InventoryConfig;
use crate::metrics::{INVENTORY_REFRESHES, INVENTORY_VEHICLES};

use super::source::InventorySource;
use super::store::SnapshotStore;
use super::types::{InventoryError, InventorySnapshot};

/// Background task that keeps the snapshot store fresh.
pub struct InventoryRefresher {
    config: InventoryConfig,
    source: Arc<dyn InventorySource>,
    store: Arc<SnapshotStore>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl InventoryRefresher {
    pub fn new(
        config: InventoryConfig,
        source: Arc<dyn InventorySource>,
        store: Arc<SnapshotStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            source,
            store,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Run one refresh cycle now. Returns the number of vehicles loaded.
    pub async fn refresh_now(&self) -> Result<usize, InventoryError> {
        Self::refresh_once(&self.source, &self.store).await
    }

    /// Start the refresh loop.
    ///
    /// When `refresh_on_startup` is set, the first refresh completes before
    /// this returns so the server starts with data when the source is up.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Inventory refresher already running");
            return;
        }

        info!(source = self.source.name(), "Starting inventory refresher");

        let mut last_ok = true;
        if self.config.refresh_on_startup {
            last_ok = self.refresh_now().await.is_ok();
        }

        self.spawn_refresh_loop(last_ok);
    }

    /// Stop the refresh loop.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Inventory refresher not running");
            return;
        }

        info!("Stopping inventory refresher");
        let _ = self.shutdown_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn spawn_refresh_loop(&self, initial_ok: bool) {
        let running = Arc::clone(&self.running);
        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        let interval = Duration::from_secs(self.config.refresh_interval_secs);
        let retry_delay = Duration::from_secs(self.config.retry_delay_secs);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Inventory refresh loop started");
            let mut last_ok = initial_ok;
            loop {
                let delay = if last_ok { interval } else { retry_delay };
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Inventory refresh loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        last_ok = Self::refresh_once(&source, &store).await.is_ok();
                    }
                }
            }
            info!("Inventory refresh loop stopped");
        });
    }

    async fn refresh_once(
        source: &Arc<dyn InventorySource>,
        store: &SnapshotStore,
    ) -> Result<usize, InventoryError> {
        info!(source = source.name(), "Refreshing inventory");
        match source.fetch().await {
            Ok(document) => {
                let snapshot = InventorySnapshot::new(document, source.name());
                let count = snapshot.vehicles.len();
                store.replace(snapshot).await;
                INVENTORY_REFRESHES.with_label_values(&["success"]).inc();
                INVENTORY_VEHICLES.set(count as i64);
                info!(vehicles = count, "Inventory refreshed");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Inventory refresh failed, keeping previous snapshot");
                INVENTORY_REFRESHES.with_label_values(&["failed"]).inc();
                store.record_failure(e.clone()).await;
                Err(e)
            }
        }
    }
}
