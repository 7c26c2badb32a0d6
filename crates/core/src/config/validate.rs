use super::{
    types::{Config, SourceBackend},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Refresh interval is not 0
/// - HTTP source has a URL
/// - Search result limit and fuzzy threshold are in range
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.inventory.refresh_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "inventory.refresh_interval_secs cannot be 0".to_string(),
        ));
    }

    if config.inventory.source == SourceBackend::Http
        && config.inventory.url.as_deref().map_or(true, str::is_empty)
    {
        return Err(ConfigError::ValidationError(
            "inventory.url is required when inventory.source = \"http\"".to_string(),
        ));
    }

    if config.search.result_limit == 0 {
        return Err(ConfigError::ValidationError(
            "search.result_limit cannot be 0".to_string(),
        ));
    }

    if !(0.0..=100.0).contains(&config.search.fuzzy_threshold) {
        return Err(ConfigError::ValidationError(format!(
            "search.fuzzy_threshold must be within 0-100, got {}",
            config.search.fuzzy_threshold
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InventoryConfig, SearchConfig, ServerConfig};
    use std::net::IpAddr;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_http_without_url_fails() {
        let config = Config {
            inventory: InventoryConfig {
                source: SourceBackend::Http,
                url: None,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_refresh_interval_fails() {
        let config = Config {
            inventory: InventoryConfig {
                refresh_interval_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_search_bounds() {
        let config = Config {
            search: SearchConfig {
                result_limit: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            search: SearchConfig {
                fuzzy_threshold: 120.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
