//! Mock inventory source for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::inventory::{InventoryDocument, InventoryError, InventorySource, VehicleRecord};

/// Mock implementation of the InventorySource trait.
///
/// Provides controllable behavior for testing:
/// - Serve a configurable vehicle list
/// - Count fetches for assertions
/// - Fail the next fetch with a chosen error
#[derive(Debug, Default)]
pub struct MockInventorySource {
    vehicles: Arc<RwLock<Vec<VehicleRecord>>>,
    generated_at: Arc<RwLock<Option<String>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<InventoryError>>>,
    fetches: Arc<RwLock<usize>>,
}

impl MockInventorySource {
    /// Create a source serving an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicles(vehicles: Vec<VehicleRecord>) -> Self {
        Self {
            vehicles: Arc::new(RwLock::new(vehicles)),
            ..Default::default()
        }
    }

    /// Replace the vehicles served by subsequent fetches.
    pub async fn set_vehicles(&self, vehicles: Vec<VehicleRecord>) {
        *self.vehicles.write().await = vehicles;
    }

    pub async fn set_generated_at(&self, generated_at: impl Into<String>) {
        *self.generated_at.write().await = Some(generated_at.into());
    }

    /// Make the next fetch fail.
    pub async fn set_next_error(&self, error: InventoryError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn fetch_count(&self) -> usize {
        *self.fetches.read().await
    }
}

#[async_trait]
impl InventorySource for MockInventorySource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self) -> Result<InventoryDocument, InventoryError> {
        *self.fetches.write().await += 1;

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(InventoryDocument {
            veiculos: self.vehicles.read().await.clone(),
            data_geracao: self.generated_at.read().await.clone(),
        })
    }
}
