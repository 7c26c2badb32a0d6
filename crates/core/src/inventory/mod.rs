//! Vehicle inventory: record model, snapshot store, data sources and the
//! periodic refresher that swaps snapshots in.

mod refresher;
mod source;
mod store;
mod summary;
mod types;

pub use refresher::InventoryRefresher;
pub use source::{create_source, HttpJsonSource, InventorySource, JsonFileSource};
pub use store::SnapshotStore;
pub use summary::{catalog_line, InventorySummary, PriceStats};
pub use types::*;
