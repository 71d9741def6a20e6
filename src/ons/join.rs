//! Spatial join of boundary polygons against LSOAs, and the per-geography
//! summaries built from it.

use hashbrown::{HashMap, HashSet};
use std::sync::Arc;

use super::index::{LsoaArea, LsoaIndex};
use crate::error::Result;
use crate::models::{
    BoundaryPolygon, GeographyTable, LaRow, LsoaRecord, LsoaRow, MsoaRow, OutputGeog, OverviewRow,
    RawJoinRow,
};

/// One intersecting (LSOA, boundary polygon) pair
#[derive(Debug, Clone)]
pub struct JoinHit {
    pub area: Arc<LsoaArea>,
    /// Position of the matched polygon in the clustered boundary
    pub index_right: usize,
    pub geohash: String,
}

/// Every intersecting (LSOA, polygon) pair, ordered by LSOA file position
/// then polygon position
pub fn spatial_join(index: &LsoaIndex, polygons: &[BoundaryPolygon]) -> Vec<JoinHit> {
    let mut hits: Vec<JoinHit> = Vec::new();
    for (i, polygon) in polygons.iter().enumerate() {
        for area in index.intersecting(&polygon.polygon) {
            hits.push(JoinHit {
                area,
                index_right: i,
                geohash: polygon.geohash.clone(),
            });
        }
    }
    hits.sort_by_key(|h| (h.area.ordinal, h.index_right));
    hits
}

/// Reduce join hits to the requested geography, keeping the first
/// occurrence of each distinct value.
///
/// Overview rows are the distinct (LSOA, MSOA, LA) triples of the join.
/// Only the raw table carries LSOA geometry.
pub fn summarise(
    hits: &[JoinHit],
    input_location: &str,
    output: OutputGeog,
) -> Result<GeographyTable> {
    let table = match output {
        OutputGeog::Raw => GeographyTable::Raw(raw_rows(hits, input_location)?),
        OutputGeog::Lsoa => GeographyTable::Lsoa(distinct(hits, |r| LsoaRow {
            input_location: input_location.to_string(),
            lsoa_code: r.lsoa_code.clone(),
            lsoa_name: r.lsoa_name.clone(),
        })),
        OutputGeog::Msoa => GeographyTable::Msoa(distinct(hits, |r| MsoaRow {
            input_location: input_location.to_string(),
            msoa_code: r.msoa_code.clone(),
            msoa_name: r.msoa_name.clone(),
        })),
        OutputGeog::La => GeographyTable::La(distinct(hits, |r| LaRow {
            input_location: input_location.to_string(),
            lad_code: r.lad_code.clone(),
            lad_name: r.lad_name.clone(),
        })),
        OutputGeog::Overview => GeographyTable::Overview(distinct(hits, |r| OverviewRow {
            input_location: input_location.to_string(),
            lad_code: r.lad_code.clone(),
            lad_name: r.lad_name.clone(),
            msoa_code: r.msoa_code.clone(),
            msoa_name: r.msoa_name.clone(),
            lsoa_code: r.lsoa_code.clone(),
            lsoa_name: r.lsoa_name.clone(),
        })),
    };
    Ok(table)
}

fn raw_rows(hits: &[JoinHit], input_location: &str) -> Result<Vec<RawJoinRow>> {
    // Geometry is serialised once per LSOA even when several polygons hit it
    let mut geometry_json: HashMap<usize, String> = HashMap::new();
    let mut rows = Vec::with_capacity(hits.len());

    for hit in hits {
        let area = &hit.area;
        let geometry = match geometry_json.get(&area.ordinal) {
            Some(g) => g.clone(),
            None => {
                let g = serde_json::to_string(&geojson::Geometry::new(geojson::Value::from(
                    &area.geometry,
                )))?;
                geometry_json.insert(area.ordinal, g.clone());
                g
            }
        };

        let record = &area.record;
        rows.push(RawJoinRow {
            input_location: input_location.to_string(),
            lsoa_code: record.lsoa_code.clone(),
            lsoa_name: record.lsoa_name.clone(),
            msoa_code: record.msoa_code.clone(),
            msoa_name: record.msoa_name.clone(),
            lad_code: record.lad_code.clone(),
            lad_name: record.lad_name.clone(),
            index_right: hit.index_right,
            geohash: hit.geohash.clone(),
            geometry,
        });
    }

    Ok(rows)
}

fn distinct<T, F>(hits: &[JoinHit], project: F) -> Vec<T>
where
    T: Clone + Eq + std::hash::Hash,
    F: Fn(&LsoaRecord) -> T,
{
    let mut seen = HashSet::new();
    hits.iter()
        .map(|h| project(&h.area.record))
        .filter(|row| seen.insert(row.clone()))
        .collect()
}
