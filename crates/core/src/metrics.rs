//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search engine (outcomes, relaxation steps, latency)
//! - Inventory refresh (results, snapshot size)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Searches total by outcome.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("estoque_searches_total", "Total inventory searches"),
        &["outcome"], // "unfiltered", "strict", "relaxed", "single_filter_not_model", "exhausted"
    )
    .unwrap()
});

/// Filters and ranges dropped while relaxing a search.
pub static FALLBACK_REMOVALS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "estoque_fallback_removals_total",
            "Total filters and ranges removed by search fallback",
        ),
        &["kind", "reason"], // kind: "filter", "range"
    )
    .unwrap()
});

/// Search duration in seconds.
pub static SEARCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "estoque_search_duration_seconds",
            "Duration of inventory searches",
        )
        .buckets(vec![0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25]),
    )
    .unwrap()
});

// =============================================================================
// Inventory Metrics
// =============================================================================

/// Inventory refreshes total by result.
pub static INVENTORY_REFRESHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "estoque_inventory_refresh_total",
            "Total inventory refresh attempts",
        ),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Vehicles in the current snapshot.
pub static INVENTORY_VEHICLES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "estoque_inventory_vehicles",
        "Number of vehicles in the current inventory snapshot",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(FALLBACK_REMOVALS.clone()),
        Box::new(SEARCH_DURATION.clone()),
        // Inventory
        Box::new(INVENTORY_REFRESHES.clone()),
        Box::new(INVENTORY_VEHICLES.clone()),
    ]
}
