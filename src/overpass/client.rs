//! Overpass API client.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::query::build_boundary_query;
use crate::config::OverpassConfig;
use crate::error::{GeoError, Result};
use crate::models::OverpassElement;

/// Runs Overpass QL queries against a single interpreter endpoint
pub struct OverpassClient {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

impl OverpassClient {
    pub fn new(config: &OverpassConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("geokit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.url.clone(),
        })
    }

    /// Run a raw query and return its elements
    pub async fn query(&self, query: &str) -> Result<Vec<OverpassElement>> {
        debug!("Overpass query:\n{}", query);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeoError::Status {
                service: "Overpass",
                status: status.as_u16(),
                body,
            });
        }

        let data: OverpassResponse = response.json().await?;
        debug!("Overpass returned {} elements", data.elements.len());
        Ok(data.elements)
    }

    /// Fetch the boundary relations named `location` in `country`, with
    /// their member ways and nodes
    pub async fn boundary_elements(
        &self,
        country: &str,
        location: &str,
    ) -> Result<Vec<OverpassElement>> {
        info!("Querying boundary of '{}' in '{}'", location, country);
        self.query(&build_boundary_query(country, location)).await
    }
}
