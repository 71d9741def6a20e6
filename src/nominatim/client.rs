//! Nominatim forward and reverse geocoding.

use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::NominatimConfig;
use crate::error::{GeoError, Result};
use crate::models::GeocodedPlace;

/// Client for a Nominatim instance (the public OSM one by default)
pub struct NominatimClient {
    client: Client,
    search_url: Url,
    reverse_url: Url,
}

/// Search and reverse both return this shape; coordinates come as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Error { error: String },
    Place(NominatimPlace),
}

impl NominatimPlace {
    fn into_place(self) -> Result<GeocodedPlace> {
        let parse = |field: &str, value: &str| {
            value.trim().parse::<f64>().map_err(|e| {
                GeoError::InvalidCoordinate(format!("Nominatim {} '{}': {}", field, value, e))
            })
        };

        Ok(GeocodedPlace {
            lat: parse("lat", &self.lat)?,
            lon: parse("lon", &self.lon)?,
            display_name: self.display_name,
        })
    }
}

impl NominatimClient {
    pub fn new(config: &NominatimConfig) -> Result<Self> {
        let mut base = Url::parse(&config.url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            search_url: base.join("search")?,
            reverse_url: base.join("reverse")?,
        })
    }

    /// Best match for a free-text query, or `None` when nothing matches
    pub async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>> {
        debug!("Geocoding '{}'", query);

        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let places: Vec<NominatimPlace> = check_status(response).await?.json().await?;

        places.into_iter().next().map(|p| p.into_place()).transpose()
    }

    /// Address at a coordinate, or `None` when the service cannot place it
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<GeocodedPlace>> {
        debug!("Reverse geocoding ({}, {})", lat, lon);

        let response = self
            .client
            .get(self.reverse_url.clone())
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        match check_status(response)
            .await?
            .json::<ReverseResponse>()
            .await?
        {
            ReverseResponse::Place(p) => p.into_place().map(Some),
            ReverseResponse::Error { error } => {
                debug!("Nominatim reverse returned no result: {}", error);
                Ok(None)
            }
        }
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GeoError::Status {
        service: "Nominatim",
        status: status.as_u16(),
        body,
    })
}
