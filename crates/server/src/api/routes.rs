use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware, vehicles};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Search
        .route("/search", get(vehicles::search))
        .route("/catalog", get(vehicles::catalog))
        .route("/vehicles/{sequencia}", get(vehicles::get_vehicle))
        .route("/summary", get(vehicles::summary))
        .route("/colors", get(vehicles::colors))
        // Refresh
        .route("/refresh", post(vehicles::refresh))
        .route("/refresh/status", get(vehicles::refresh_status))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
