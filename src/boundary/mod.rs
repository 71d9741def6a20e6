//! Place name to boundary polygons.
//!
//! Fetches the boundary relations for a name from Overpass, clusters their
//! nodes by geohash and returns one convex hull per cluster.

mod cluster;

pub use cluster::{boundary_nodes, cluster_nodes};

use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::json;
use std::io::Write;
use tracing::info;

use crate::error::{GeoError, Result};
use crate::models::{BoundaryNode, BoundaryPolygon};
use crate::overpass::OverpassClient;

/// Result of a boundary lookup
#[derive(Debug, Clone)]
pub enum BoundaryOutput {
    /// One convex hull per geohash cluster
    Polygons(Vec<BoundaryPolygon>),
    /// The raw boundary nodes
    Coordinates(Vec<BoundaryNode>),
}

impl BoundaryOutput {
    pub fn len(&self) -> usize {
        match self {
            BoundaryOutput::Polygons(p) => p.len(),
            BoundaryOutput::Coordinates(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetch and cluster the boundary nodes of `location` in `country`.
///
/// Fails with [`GeoError::NoBoundary`] when the name has no boundary
/// relation (neighbourhoods without city limits, misspellings).
pub async fn fetch_boundary_nodes(
    client: &OverpassClient,
    country: &str,
    location: &str,
    precision: usize,
) -> Result<Vec<BoundaryNode>> {
    let elements = client.boundary_elements(country, location).await?;
    let nodes = boundary_nodes(&elements, precision)?;

    if nodes.is_empty() {
        return Err(GeoError::NoBoundary(location.to_string()));
    }

    Ok(nodes)
}

/// Look up the boundary of `location` in `country`.
///
/// Returns polygons when `return_geometry` is set, otherwise the boundary
/// node coordinates.
pub async fn convert_string_to_boundary(
    client: &OverpassClient,
    country: &str,
    location: &str,
    return_geometry: bool,
    precision: usize,
) -> Result<BoundaryOutput> {
    let nodes = fetch_boundary_nodes(client, country, location, precision).await?;

    if !return_geometry {
        info!("Found {} boundary nodes for '{}'", nodes.len(), location);
        return Ok(BoundaryOutput::Coordinates(nodes));
    }

    let polygons = cluster_nodes(&nodes);
    info!(
        "There are {} polygons in the input location '{}'",
        polygons.len(),
        location
    );

    Ok(BoundaryOutput::Polygons(polygons))
}

/// Build a GeoJSON FeatureCollection with one feature per polygon
pub fn polygons_to_geojson(polygons: &[BoundaryPolygon]) -> FeatureCollection {
    let features = polygons
        .iter()
        .map(|p| {
            let mut properties = JsonObject::new();
            properties.insert("geohash".to_string(), json!(p.geohash));
            properties.insert("type".to_string(), json!(p.element_type.to_string()));
            properties.insert("count".to_string(), json!(p.node_count));

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&p.polygon))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Write the lookup result: polygons as GeoJSON, coordinates as CSV
pub fn write_boundary<W: Write>(output: &BoundaryOutput, mut writer: W) -> Result<()> {
    match output {
        BoundaryOutput::Polygons(polygons) => {
            serde_json::to_writer_pretty(&mut writer, &polygons_to_geojson(polygons))?;
            writer.write_all(b"\n")?;
        }
        BoundaryOutput::Coordinates(nodes) => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            for node in nodes {
                csv_writer.serialize(node)?;
            }
            csv_writer.flush()?;
        }
    }
    Ok(())
}
