//! Spatial index over LSOA polygons for the boundary join.

use geo::{BoundingRect, Intersects, MultiPolygon, Polygon};
use hashbrown::HashMap;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{info, warn};

use super::boundaries::LsoaBoundary;
use crate::models::LsoaRecord;

/// An LSOA polygon left-joined with its lookup row
#[derive(Debug, Clone)]
pub struct LsoaArea {
    /// Position in the boundary file
    pub ordinal: usize,
    pub record: LsoaRecord,
    pub geometry: MultiPolygon<f64>,
}

/// Wrapper for R-tree indexing of LSOA areas
#[derive(Clone)]
pub struct IndexedLsoa {
    pub area: Arc<LsoaArea>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedLsoa {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedLsoa {
    pub fn new(area: LsoaArea) -> Option<Self> {
        let rect = area.geometry.bounding_rect()?;
        Some(Self {
            area: Arc::new(area),
            envelope: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
        })
    }
}

/// Spatial index for LSOA polygons using R-tree
pub struct LsoaIndex {
    tree: RTree<IndexedLsoa>,
}

impl LsoaIndex {
    /// Build the index, attaching lookup rows by LSOA code.
    ///
    /// LSOAs missing from the lookup keep their code with empty names and
    /// parent codes.
    pub fn build(boundaries: Vec<LsoaBoundary>, lookup: &HashMap<String, LsoaRecord>) -> Self {
        info!("Building spatial index for {} LSOAs...", boundaries.len());

        let mut unmatched = 0usize;

        let indexed: Vec<IndexedLsoa> = boundaries
            .into_iter()
            .filter_map(|b| {
                let record = match lookup.get(&b.code) {
                    Some(r) => r.clone(),
                    None => {
                        unmatched += 1;
                        LsoaRecord {
                            lsoa_code: b.code,
                            ..Default::default()
                        }
                    }
                };
                IndexedLsoa::new(LsoaArea {
                    ordinal: b.ordinal,
                    record,
                    geometry: b.geometry,
                })
            })
            .collect();

        if unmatched > 0 {
            warn!("{} LSOAs have no row in the lookup table", unmatched);
        }

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// All LSOAs whose geometry intersects `polygon`, in boundary file order
    pub fn intersecting(&self, polygon: &Polygon<f64>) -> Vec<Arc<LsoaArea>> {
        let rect = match polygon.bounding_rect() {
            Some(r) => r,
            None => return Vec::new(),
        };
        let query_envelope =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        // Envelope candidates first, then the exact predicate
        let mut hits: Vec<Arc<LsoaArea>> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|il| il.area.geometry.intersects(polygon))
            .map(|il| Arc::clone(&il.area))
            .collect();

        hits.sort_by_key(|a| a.ordinal);
        hits
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_square(ordinal: usize, code: &str, x: f64, y: f64) -> LsoaBoundary {
        LsoaBoundary {
            ordinal,
            code: code.to_string(),
            geometry: MultiPolygon::new(vec![polygon![
                (x: x, y: y),
                (x: x + 1.0, y: y),
                (x: x + 1.0, y: y + 1.0),
                (x: x, y: y + 1.0),
                (x: x, y: y),
            ]]),
        }
    }

    fn lookup() -> HashMap<String, LsoaRecord> {
        let mut map = HashMap::new();
        map.insert(
            "A".to_string(),
            LsoaRecord {
                lsoa_code: "A".to_string(),
                lsoa_name: "A name".to_string(),
                msoa_code: "M1".to_string(),
                msoa_name: "M1 name".to_string(),
                lad_code: "L1".to_string(),
                lad_name: "L1 name".to_string(),
            },
        );
        map
    }

    #[test]
    fn test_empty_index() {
        let index = LsoaIndex::build(vec![], &lookup());
        assert!(index.is_empty());
        let probe = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)];
        assert!(index.intersecting(&probe).is_empty());
    }

    #[test]
    fn test_intersecting_uses_exact_geometry() {
        let index = LsoaIndex::build(
            vec![
                unit_square(0, "A", 0.0, 0.0),
                unit_square(1, "B", 1.0, 0.0),
                unit_square(2, "C", 5.0, 5.0),
            ],
            &lookup(),
        );
        assert_eq!(index.len(), 3);

        // Small triangle inside A only
        let probe = polygon![(x: 0.2, y: 0.2), (x: 0.4, y: 0.2), (x: 0.3, y: 0.4), (x: 0.2, y: 0.2)];
        let hits = index.intersecting(&probe);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.lsoa_code, "A");
        assert_eq!(hits[0].record.lad_code, "L1");

        // Straddles A and B, ordered by file position
        let probe = polygon![(x: 0.8, y: 0.2), (x: 1.2, y: 0.2), (x: 1.0, y: 0.6), (x: 0.8, y: 0.2)];
        let hits = index.intersecting(&probe);
        let codes: Vec<&str> = hits.iter().map(|a| a.record.lsoa_code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
        assert_eq!(hits[1].record.lad_code, "");
    }
}
