use std::sync::Arc;
use estoque_core::{Config, InventoryRefresher, SanitizedConfig, SearchEngine, SnapshotStore};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<SnapshotStore>,
    engine: SearchEngine,
    refresher: Option<Arc<InventoryRefresher>>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<SnapshotStore>,
        refresher: Option<Arc<InventoryRefresher>>,
    ) -> Self {
        let engine = SearchEngine::new(config.search.clone());
        Self {
            config,
            store,
            engine,
            refresher,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &SnapshotStore {
        self.store.as_ref()
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// The refresher, when one is wired in.
    pub fn refresher(&self) -> Option<&Arc<InventoryRefresher>> {
        self.refresher.as_ref()
    }
}
