//! Clustering of boundary nodes into polygons.
//!
//! A boundary relation can match several places sharing a name. Its nodes
//! are grouped by a short geohash prefix and each group becomes the convex
//! hull of its points.

use geo::{ConvexHull, Coord, MultiPoint, Point};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::Result;
use crate::models::{BoundaryNode, BoundaryPolygon, ElementType, OverpassElement};

/// Extract the untagged nodes of an Overpass response, labelled with their
/// geohash at `precision` characters
pub fn boundary_nodes(elements: &[OverpassElement], precision: usize) -> Result<Vec<BoundaryNode>> {
    let mut nodes = Vec::new();

    for element in elements {
        // Tagged elements are the relations themselves (and the odd tagged node)
        if element.is_tagged() || element.element_type != ElementType::Node {
            continue;
        }

        let (lat, lon) = match (element.lat, element.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => continue,
        };

        let geohash = geohash::encode(Coord { x: lon, y: lat }, precision)?;
        nodes.push(BoundaryNode {
            id: element.id,
            lat,
            lon,
            geohash,
        });
    }

    debug!(
        "{} boundary nodes out of {} elements",
        nodes.len(),
        elements.len()
    );

    Ok(nodes)
}

/// Dissolve nodes by geohash and take the convex hull of each group.
///
/// Polygons come out ordered by geohash.
pub fn cluster_nodes(nodes: &[BoundaryNode]) -> Vec<BoundaryPolygon> {
    let mut groups: BTreeMap<&str, Vec<Point<f64>>> = BTreeMap::new();

    for node in nodes {
        groups
            .entry(node.geohash.as_str())
            .or_default()
            .push(Point::new(node.lon, node.lat));
    }

    groups
        .into_iter()
        .map(|(geohash, points)| {
            let node_count = points.len();
            let polygon = MultiPoint::new(points).convex_hull();
            BoundaryPolygon {
                geohash: geohash.to_string(),
                element_type: ElementType::Node,
                node_count,
                polygon,
            }
        })
        .collect()
}
