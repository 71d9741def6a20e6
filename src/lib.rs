//! Geokit - geocoding and boundary lookups over OpenStreetMap and ONS data
//!
//! This library provides the lookups behind the `geokit` binary: place
//! boundaries from Overpass, UK statistical geographies from local ONS
//! files, and bulk forward/reverse geocoding through Nominatim.

pub mod boundary;
pub mod config;
pub mod error;
pub mod geocode;
pub mod models;
pub mod nominatim;
pub mod ons;
pub mod overpass;

pub use config::Config;
pub use error::{GeoError, Result};
pub use models::{GeographyTable, OutputGeog};
pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;
