use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Where inventory snapshots come from.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceBackend {
    /// JSON file written by the upstream feed converter.
    #[default]
    File,
    /// JSON document fetched over HTTP.
    Http,
}

/// Inventory source and refresh schedule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub source: SourceBackend,
    /// Snapshot file (used when source = "file").
    #[serde(default = "default_inventory_path")]
    pub path: PathBuf,
    /// Feed URL (required when source = "http").
    #[serde(default)]
    pub url: Option<String>,
    /// HTTP request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Delay between successful refreshes (default: 2 hours).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Delay before retrying after a failed refresh (default: 5 minutes).
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_true")]
    pub refresh_on_startup: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            source: SourceBackend::default(),
            path: default_inventory_path(),
            url: None,
            timeout_secs: default_timeout(),
            refresh_interval_secs: default_refresh_interval(),
            retry_delay_secs: default_retry_delay(),
            refresh_on_startup: true,
        }
    }
}

fn default_inventory_path() -> PathBuf {
    PathBuf::from("estoque.json")
}

fn default_timeout() -> u32 {
    30
}

fn default_refresh_interval() -> u64 {
    2 * 60 * 60
}

fn default_retry_delay() -> u64 {
    5 * 60
}

fn default_true() -> bool {
    true
}

/// Tunables of the search engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Maximum vehicles returned by a filtered search.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    /// Added to `valormax` before the price ceiling is applied.
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: f64,
    /// Years subtracted from `anomax` to form the year floor.
    #[serde(default = "default_year_lookback")]
    pub year_lookback: i32,
    /// Added to the mileage reference to form the band's upper bound.
    #[serde(default = "default_mileage_tolerance")]
    pub mileage_tolerance: i64,
    /// Minimum similarity score (0-100) for a fuzzy match.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            price_tolerance: default_price_tolerance(),
            year_lookback: default_year_lookback(),
            mileage_tolerance: default_mileage_tolerance(),
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

fn default_result_limit() -> usize {
    6
}

fn default_price_tolerance() -> f64 {
    25_000.0
}

fn default_year_lookback() -> i32 {
    3
}

fn default_mileage_tolerance() -> i64 {
    30_000
}

fn default_fuzzy_threshold() -> f64 {
    80.0
}

/// Sanitized config for API responses (feed URL hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub inventory: SanitizedInventoryConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedInventoryConfig {
    pub source: SourceBackend,
    pub path: PathBuf,
    pub url_configured: bool,
    pub refresh_interval_secs: u64,
    pub retry_delay_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            inventory: SanitizedInventoryConfig {
                source: config.inventory.source,
                path: config.inventory.path.clone(),
                url_configured: config
                    .inventory
                    .url
                    .as_ref()
                    .is_some_and(|u| !u.is_empty()),
                refresh_interval_secs: config.inventory.refresh_interval_secs,
                retry_delay_secs: config.inventory.retry_delay_secs,
            },
            search: config.search.clone(),
        }
    }
}
