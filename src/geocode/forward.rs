use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::{ensure_csv, pause, progress_bar, GeocodeSummary};
use crate::error::{GeoError, Result};
use crate::models::CoordinateRecord;
use crate::nominatim::NominatimClient;

/// Header of the single input column
pub const LOCATIONS_COLUMN: &str = "LOCATIONS";

const OUTPUT_HEADER: [&str; 5] = ["location_name", "long", "lat", "wkt", "address_exact"];

/// Build the geocoder query for one location.
///
/// A non-empty suffix is appended after a comma; leading commas and spaces
/// in the suffix are dropped so `",United Kingdom"` and `"United Kingdom"`
/// behave the same.
pub(crate) fn build_query(location: &str, append: &str) -> String {
    let suffix = append.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    if suffix.trim().is_empty() {
        location.trim().to_string()
    } else {
        format!("{}, {}", location.trim(), suffix.trim_end())
    }
}

/// Geocode every row of a `LOCATIONS` CSV into `output`.
///
/// Output columns are `location_name,long,lat,wkt,address_exact`. The file
/// is truncated first and every row is flushed as it is written.
pub async fn convert_string_to_coordinates(
    client: &NominatimClient,
    input: &Path,
    output: &Path,
    append: &str,
    delay: Duration,
) -> Result<GeocodeSummary> {
    ensure_csv(input)?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(input)?;
    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == LOCATIONS_COLUMN)
        .ok_or_else(|| GeoError::MissingColumn {
            column: LOCATIONS_COLUMN.to_string(),
            path: input.to_path_buf(),
        })?;

    let locations: Vec<String> = reader
        .records()
        .map(|r| r.map(|rec| rec.get(column).unwrap_or("").to_string()))
        .collect::<std::result::Result<_, _>>()?;

    info!(
        "Geocoding {} locations from {}",
        locations.len(),
        input.display()
    );

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(File::create(output)?);
    writer.write_record(OUTPUT_HEADER)?;
    writer.flush()?;

    let mut summary = GeocodeSummary::default();
    let pb = progress_bar(locations.len());

    for location in &locations {
        let query = build_query(location, append);

        let record = match client.geocode(&query).await {
            Ok(Some(place)) => CoordinateRecord::matched(location, &place),
            Ok(None) => CoordinateRecord::failed(location, GeoError::NoMatch(query.clone())),
            Err(e) => CoordinateRecord::failed(location, e),
        };

        if record.is_match() {
            info!("{} -> {}", location, record.wkt);
        } else {
            summary.failures += 1;
            warn!("{} -> {}", location, record.address_exact);
        }

        writer.serialize(&record)?;
        writer.flush()?;
        summary.rows += 1;
        pb.inc(1);

        pause(delay).await;
    }

    pb.finish_and_clear();
    info!(
        "Program has finished running: {} rows written to {} ({} failed)",
        summary.rows,
        output.display(),
        summary.failures
    );

    Ok(summary)
}
