//! Forward and reverse geocoding through Nominatim.

mod client;

pub use client::NominatimClient;
