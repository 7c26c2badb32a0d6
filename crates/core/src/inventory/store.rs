//! Atomically swappable holder of the current inventory snapshot.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::{InventoryError, InventorySnapshot, RefreshStatus};

#[derive(Debug, Default)]
struct StatusState {
    status: RefreshStatus,
    last_failure: Option<InventoryError>,
}

/// Holds the latest fully-loaded snapshot.
///
/// Readers clone the `Arc` and keep working on the snapshot they started
/// with; `replace` swaps the pointer, so a reader never observes a
/// partially-updated collection.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<InventorySnapshot>>>,
    state: RwLock<StatusState>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a snapshot.
    pub fn with_snapshot(snapshot: InventorySnapshot) -> Self {
        let total = snapshot.vehicles.len();
        let loaded_at = snapshot.loaded_at;
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
            state: RwLock::new(StatusState {
                status: RefreshStatus {
                    last_update: Some(loaded_at),
                    last_attempt: Some(loaded_at),
                    total_vehicles: total,
                    refresh_count: 1,
                    ..Default::default()
                },
                last_failure: None,
            }),
        }
    }

    /// The current snapshot.
    ///
    /// Without a snapshot this reports `InvalidData` when the most recent
    /// load was rejected for its shape, `Unavailable` otherwise.
    pub async fn current(&self) -> Result<Arc<InventorySnapshot>, InventoryError> {
        if let Some(snapshot) = self.current.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        match &self.state.read().await.last_failure {
            Some(InventoryError::InvalidData(msg)) => Err(InventoryError::InvalidData(msg.clone())),
            _ => Err(InventoryError::Unavailable),
        }
    }

    /// Whether any snapshot has been loaded.
    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Swap in a new snapshot wholesale.
    pub async fn replace(&self, snapshot: InventorySnapshot) {
        let total = snapshot.vehicles.len();
        let loaded_at = snapshot.loaded_at;
        *self.current.write().await = Some(Arc::new(snapshot));

        let mut state = self.state.write().await;
        state.status.last_update = Some(loaded_at);
        state.status.last_attempt = Some(loaded_at);
        state.status.last_error = None;
        state.status.total_vehicles = total;
        state.status.refresh_count += 1;
        state.last_failure = None;
    }

    /// Record a failed refresh. The current snapshot, if any, is kept.
    pub async fn record_failure(&self, error: InventoryError) {
        let mut state = self.state.write().await;
        state.status.last_attempt = Some(Utc::now());
        state.status.last_error = Some(error.to_string());
        state.status.failure_count += 1;
        state.last_failure = Some(error);
    }

    pub async fn status(&self) -> RefreshStatus {
        self.state.read().await.status.clone()
    }
}
