//! LSOA boundary polygons from the ONS GeoJSON download.

use geo::{BoundingRect, Geometry, MultiPolygon};
use geojson::FeatureCollection;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{GeoError, Result};

/// Property holding the LSOA code
pub const LSOA_CODE_PROPERTY: &str = "LSOA21CD";

/// A single LSOA polygon; `ordinal` is its position in the source file
#[derive(Debug, Clone)]
pub struct LsoaBoundary {
    pub ordinal: usize,
    pub code: String,
    pub geometry: MultiPolygon<f64>,
}

/// Read the whole boundary file into memory, keeping only the code and
/// geometry of each feature.
///
/// The file must be in lon/lat. Eastings/northings (EPSG:27700 exports)
/// are rejected rather than reprojected.
pub fn load_lsoa_boundaries(path: &Path) -> Result<Vec<LsoaBoundary>> {
    info!("Reading in LSOA boundary file... This will take a while...");
    let file = File::open(path)?;
    let boundaries = read_lsoa_boundaries(BufReader::new(file), path)?;
    info!("Loaded {} LSOA boundaries", boundaries.len());
    Ok(boundaries)
}

fn read_lsoa_boundaries<R: Read>(reader: R, path: &Path) -> Result<Vec<LsoaBoundary>> {
    let collection: FeatureCollection = serde_json::from_reader(reader)?;

    let total = collection.features.len();
    let mut boundaries = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for feature in collection.features {
        let code = match feature
            .property(LSOA_CODE_PROPERTY)
            .and_then(|v| v.as_str())
        {
            Some(code) => code.to_string(),
            None => {
                skipped += 1;
                continue;
            }
        };

        let geometry = match feature.geometry {
            Some(g) => Geometry::<f64>::try_from(g.value)?,
            None => {
                debug!("LSOA {} has no geometry", code);
                skipped += 1;
                continue;
            }
        };

        let geometry = match geometry {
            Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            Geometry::MultiPolygon(mp) => mp,
            _ => {
                debug!("LSOA {} is not a polygon", code);
                skipped += 1;
                continue;
            }
        };

        if let Some(rect) = geometry.bounding_rect() {
            if rect.min().x < -180.0
                || rect.max().x > 180.0
                || rect.min().y < -90.0
                || rect.max().y > 90.0
            {
                return Err(GeoError::UnsupportedCrs(path.to_path_buf()));
            }
        }

        boundaries.push(LsoaBoundary {
            ordinal: boundaries.len(),
            code,
            geometry,
        });
    }

    if total > 0 && boundaries.is_empty() {
        return Err(GeoError::MissingColumn {
            column: LSOA_CODE_PROPERTY.to_string(),
            path: path.to_path_buf(),
        });
    }

    if skipped > 0 {
        warn!("Skipped {} features without an LSOA polygon", skipped);
    }

    Ok(boundaries)
}
