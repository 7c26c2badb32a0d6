//! Inventory data sources.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::{InventoryConfig, SourceBackend};

use super::types::{parse_inventory, InventoryDocument, InventoryError};

/// Something that can produce a full inventory document on demand.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Source name for logging and status.
    fn name(&self) -> &str;

    /// Fetch and parse the complete inventory.
    async fn fetch(&self) -> Result<InventoryDocument, InventoryError>;
}

/// Reads the JSON snapshot file written by the feed converter.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }
}

#[async_trait]
impl InventorySource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<InventoryDocument, InventoryError> {
        debug!(path = %self.path.display(), "Reading inventory file");
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| InventoryError::Io(format!("{}: {}", self.path.display(), e)))?;
        parse_inventory(&bytes)
    }
}

/// Fetches the JSON inventory over HTTP.
#[derive(Debug, Clone)]
pub struct HttpJsonSource {
    client: Client,
    url: String,
    name: String,
}

impl HttpJsonSource {
    pub fn new(url: impl Into<String>, timeout_secs: u32) -> Result<Self, InventoryError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .map_err(|e| InventoryError::Fetch(format!("failed to create HTTP client: {}", e)))?;
        let name = format!("http:{}", url);
        Ok(Self { client, url, name })
    }
}

#[async_trait]
impl InventorySource for HttpJsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<InventoryDocument, InventoryError> {
        debug!(url = %self.url, "Fetching inventory");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InventoryError::Fetch("request timed out".to_string())
                } else {
                    InventoryError::Fetch(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InventoryError::Fetch(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| InventoryError::Fetch(format!("failed to read body: {}", e)))?;
        parse_inventory(&bytes)
    }
}

/// Build the source selected in configuration.
pub fn create_source(config: &InventoryConfig) -> Result<Arc<dyn InventorySource>, InventoryError> {
    match config.source {
        SourceBackend::File => Ok(Arc::new(JsonFileSource::new(config.path.clone()))),
        SourceBackend::Http => {
            let url = config
                .url
                .as_deref()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| InventoryError::Fetch("no inventory URL configured".to_string()))?;
            Ok(Arc::new(HttpJsonSource::new(url, config.timeout_secs)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_file_source_reads_document() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"veiculos": [{{"sequencia": 1, "veiculo": "FIAT UNO"}}]}}"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        let doc = source.fetch().await.unwrap();
        assert_eq!(doc.veiculos.len(), 1);
        assert!(source.name().starts_with("file:"));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = JsonFileSource::new("/nonexistent/estoque.json");
        assert!(matches!(source.fetch().await, Err(InventoryError::Io(_))));
    }

    #[tokio::test]
    async fn test_file_source_invalid_shape() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"cars": []}}"#).unwrap();

        let source = JsonFileSource::new(file.path());
        assert!(matches!(
            source.fetch().await,
            Err(InventoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_create_source_selects_backend() {
        let file = create_source(&InventoryConfig::default()).unwrap();
        assert_eq!(file.name(), "file:estoque.json");

        let http = create_source(&InventoryConfig {
            source: SourceBackend::Http,
            url: Some("http://localhost:9/estoque.json".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(http.name(), "http:http://localhost:9/estoque.json");

        let missing_url = create_source(&InventoryConfig {
            source: SourceBackend::Http,
            url: None,
            ..Default::default()
        });
        assert!(missing_url.is_err());
    }
}
