use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::{ensure_csv, pause, progress_bar, GeocodeSummary};
use crate::error::{GeoError, Result};
use crate::models::{AddressRecord, CoordinateInput};
use crate::nominatim::NominatimClient;

fn parse_coordinate(name: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| GeoError::InvalidCoordinate(format!("invalid {} '{}': {}", name, value, e)))
}

async fn lookup(client: &NominatimClient, row: &CoordinateInput) -> Result<String> {
    let lat = parse_coordinate("lat", &row.lat)?;
    let lon = parse_coordinate("long", &row.long)?;
    Ok(client
        .reverse(lat, lon)
        .await?
        .map(|p| p.display_name)
        .unwrap_or_default())
}

/// Reverse geocode a `location,lat,long` CSV into `output`.
///
/// Output columns are `location,lat,long,output_address`; coordinates are
/// echoed exactly as read. An error (including an unparseable coordinate)
/// is written as the address text; no result leaves the address empty.
pub async fn convert_coordinates_to_address(
    client: &NominatimClient,
    input: &Path,
    output: &Path,
    delay: Duration,
) -> Result<GeocodeSummary> {
    ensure_csv(input)?;

    // Short or long rows are kept; their missing fields read as empty
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(input)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
            .ok_or_else(|| GeoError::MissingColumn {
                column: name.to_string(),
                path: input.to_path_buf(),
            })
    };
    let location_idx = column("location")?;
    let lat_idx = column("lat")?;
    let long_idx = column("long")?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        rows.push(CoordinateInput {
            location: field(location_idx),
            lat: field(lat_idx),
            long: field(long_idx),
        });
    }

    info!(
        "Reverse geocoding {} coordinates from {}",
        rows.len(),
        input.display()
    );

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(File::create(output)?);
    writer.write_record(["location", "lat", "long", "output_address"])?;
    writer.flush()?;

    let mut summary = GeocodeSummary::default();
    let pb = progress_bar(rows.len());

    for row in rows {
        let output_address = match lookup(client, &row).await {
            Ok(address) => {
                info!("{} ({}, {}) -> {}", row.location, row.lat, row.long, address);
                address
            }
            Err(e) => {
                summary.failures += 1;
                warn!("{} ({}, {}) -> {}", row.location, row.lat, row.long, e);
                e.to_string()
            }
        };

        writer.serialize(AddressRecord {
            location: row.location,
            lat: row.lat,
            long: row.long,
            output_address,
        })?;
        writer.flush()?;
        summary.rows += 1;
        pb.inc(1);

        pause(delay).await;
    }

    pb.finish_and_clear();
    info!(
        "Conversion complete: {} rows written to {} ({} failed)",
        summary.rows,
        output.display(),
        summary.failures
    );

    Ok(summary)
}
