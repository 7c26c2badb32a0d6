pub mod config;
pub mod inventory;
pub mod metrics;
pub mod search;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, InventoryConfig,
    SanitizedConfig, SearchConfig, ServerConfig, SourceBackend,
};
pub use inventory::{
    catalog_line, create_source, parse_inventory, FieldValue, HttpJsonSource, InventoryDocument,
    InventoryError, InventoryRefresher, InventorySnapshot, InventorySource, InventorySummary,
    JsonFileSource, PriceStats, RecordId, RefreshStatus, SnapshotStore, VehicleRecord,
};
pub use search::{
    color_mapping, ExcludedIds, FallbackInfo, FilterField, FilterSet, RangeBounds, RangeKind, RemovalKind,
    RemovalReason, RemovedFilter, SearchEngine, SearchOutcome, SearchRequest, SearchResult,
};
