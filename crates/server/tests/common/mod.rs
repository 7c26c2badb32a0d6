//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock inventory source injected, so the HTTP surface can be
//! exercised without a feed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use estoque_core::{
    testing::MockInventorySource, Config, InventoryConfig, InventoryRefresher, SnapshotStore,
};

/// Re-export fixtures for test convenience
pub use estoque_core::testing::fixtures;

/// Test fixture for API testing with a mock inventory source.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     let response = fixture.get("/api/v1/search?veiculo=onix").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock inventory source - control what refreshes load
    pub source: Arc<MockInventorySource>,
    /// Snapshot store shared with the router
    pub store: Arc<SnapshotStore>,
    /// Refresher wired to the mock source
    pub refresher: Arc<InventoryRefresher>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw body, for non-JSON responses
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with the sample inventory already loaded.
    pub async fn new() -> Self {
        let fixture = Self::empty().await;
        fixture
            .refresher
            .refresh_now()
            .await
            .expect("Failed to load sample inventory");
        fixture
    }

    /// Create a fixture whose store has not loaded anything yet.
    pub async fn empty() -> Self {
        Self::with_source(MockInventorySource::with_vehicles(fixtures::sample_inventory())).await
    }

    pub async fn with_source(source: MockInventorySource) -> Self {
        let source = Arc::new(source);
        let store = Arc::new(SnapshotStore::new());

        let config = Config {
            inventory: InventoryConfig {
                refresh_on_startup: false,
                ..Default::default()
            },
            ..Default::default()
        };

        let refresher = Arc::new(InventoryRefresher::new(
            config.inventory.clone(),
            Arc::clone(&source) as Arc<dyn estoque_core::InventorySource>,
            Arc::clone(&store),
        ));

        let state = Arc::new(estoque_server::state::AppState::new(
            config,
            Arc::clone(&store),
            Some(Arc::clone(&refresher)),
        ));

        // Create router
        let router = estoque_server::api::create_router(state);

        Self {
            router,
            source,
            store,
            refresher,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
