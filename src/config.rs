//! TOML configuration for the external services.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration against the public OSM endpoints.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::{GeoError, Result};

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub overpass: OverpassConfig,
    pub nominatim: NominatimConfig,
    pub clustering: ClusteringConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OverpassConfig {
    /// Full interpreter endpoint
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NominatimConfig {
    /// Base URL; `search` and `reverse` are resolved against it
    pub url: String,
    pub user_agent: String,
    /// Pause after every request in the bulk paths
    pub delay_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Geohash length used to group boundary nodes into polygons
    pub geohash_precision: usize,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_string(),
            timeout_secs: 180,
        }
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: concat!("geokit/", env!("CARGO_PKG_VERSION")).to_string(),
            delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            geohash_precision: 3,
        }
    }
}

impl NominatimConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.overpass.url)?;
        Url::parse(&self.nominatim.url)?;

        if self.nominatim.user_agent.trim().is_empty() {
            return Err(GeoError::Config(
                "nominatim.user_agent must not be empty".to_string(),
            ));
        }

        if !(1..=12).contains(&self.clustering.geohash_precision) {
            return Err(GeoError::Config(format!(
                "clustering.geohash_precision must be between 1 and 12, got {}",
                self.clustering.geohash_precision
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.overpass.url, DEFAULT_OVERPASS_URL);
        assert_eq!(config.nominatim.delay_ms, 1000);
        assert_eq!(config.clustering.geohash_precision, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [nominatim]
            url = "http://localhost:8080/"
            delay_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.nominatim.url, "http://localhost:8080/");
        assert_eq!(config.nominatim.delay_ms, 0);
        assert!(config.nominatim.user_agent.starts_with("geokit/"));
    }

    #[test]
    fn test_rejects_bad_precision() {
        let mut config = Config::default();
        config.clustering.geohash_precision = 0;
        assert!(matches!(config.validate(), Err(GeoError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut config = Config::default();
        config.overpass.url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(GeoError::Url(_))));
    }
}
