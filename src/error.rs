//! Library error type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Geohash error: {0}")]
    Geohash(#[from] geohash::GeohashError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("The path must be a .csv file: {}", .0.display())]
    InvalidExtension(PathBuf),

    #[error("Column '{column}' not found in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("No boundary nodes found for '{0}'")]
    NoBoundary(String),

    #[error("No match found for '{0}'")]
    NoMatch(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Unknown output geography '{0}' (expected lsoa, msoa, la, overview or raw)")]
    UnknownOutputGeog(String),

    #[error("Boundary file {} is not in lon/lat (WGS84) coordinates", .0.display())]
    UnsupportedCrs(PathBuf),
}

pub type Result<T> = std::result::Result<T, GeoError>;
