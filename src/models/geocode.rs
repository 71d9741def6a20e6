//! Rows written by the bulk geocoding commands.

use serde::{Deserialize, Serialize};

/// A best-match place returned by the geocoder
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

impl GeocodedPlace {
    /// Point geometry as WKT, x = longitude
    pub fn wkt(&self) -> String {
        format!("POINT ({} {})", self.lon, self.lat)
    }
}

/// Output row of forward geocoding.
///
/// On failure the coordinate columns are empty and `address_exact` holds
/// the error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    pub location_name: String,
    pub long: Option<f64>,
    pub lat: Option<f64>,
    pub wkt: String,
    pub address_exact: String,
}

impl CoordinateRecord {
    pub fn matched(location_name: &str, place: &GeocodedPlace) -> Self {
        Self {
            location_name: location_name.to_string(),
            long: Some(place.lon),
            lat: Some(place.lat),
            wkt: place.wkt(),
            address_exact: place.display_name.clone(),
        }
    }

    pub fn failed(location_name: &str, error: impl std::fmt::Display) -> Self {
        Self {
            location_name: location_name.to_string(),
            long: None,
            lat: None,
            wkt: String::new(),
            address_exact: error.to_string(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.lat.is_some() && self.long.is_some()
    }
}

/// Input row of reverse geocoding; coordinates are echoed verbatim
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordinateInput {
    pub location: String,
    pub lat: String,
    pub long: String,
}

/// Output row of reverse geocoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub location: String,
    pub lat: String,
    pub long: String,
    pub output_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wkt_is_lon_lat() {
        let place = GeocodedPlace {
            lat: 51.5074,
            lon: -0.1278,
            display_name: "London".to_string(),
        };
        assert_eq!(place.wkt(), "POINT (-0.1278 51.5074)");

        let record = CoordinateRecord::matched("London", &place);
        assert_eq!(record.long, Some(-0.1278));
        assert_eq!(record.lat, Some(51.5074));
        assert!(record.is_match());
    }

    #[test]
    fn test_failed_record_carries_message() {
        let record = CoordinateRecord::failed("Nowhere", "No match found for 'Nowhere'");
        assert!(!record.is_match());
        assert!(record.wkt.is_empty());
        assert_eq!(record.address_exact, "No match found for 'Nowhere'");
    }
}
