//! ONS LSOA → MSOA → LAD lookup table.

use csv::ReaderBuilder;
use hashbrown::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::error::{GeoError, Result};
use crate::models::LsoaRecord;

const COLUMNS: [&str; 6] = [
    "LSOA21CD", "LSOA21NM", "MSOA21CD", "MSOA21NM", "LAD22CD", "LAD22NM",
];

/// Load the lookup CSV keyed by LSOA21CD.
///
/// Only the six LSOA/MSOA/LAD code and name columns are read; any other
/// columns (OA, LEP, ...) are ignored. The published table is at Output
/// Area grain so LSOAs repeat; the first row for each LSOA wins.
pub fn load_lookup(path: &Path) -> Result<HashMap<String, LsoaRecord>> {
    info!("Loading LSOA-MSOA-LA lookup from {}", path.display());
    let file = File::open(path)?;
    let lookup = read_lookup(file, path)?;
    info!("Loaded {} LSOA lookup rows", lookup.len());
    Ok(lookup)
}

fn read_lookup<R: Read>(reader: R, path: &Path) -> Result<HashMap<String, LsoaRecord>> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();

    // Find column indices
    let mut idx = [0usize; 6];
    for (slot, column) in idx.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
            .ok_or_else(|| GeoError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            })?;
    }

    let mut map = HashMap::new();

    for result in csv_reader.records() {
        let record = result?;
        let field = |i: usize| record.get(idx[i]).unwrap_or("").to_string();

        let lsoa_code = field(0);
        if lsoa_code.is_empty() {
            continue;
        }

        map.entry(lsoa_code.clone()).or_insert_with(|| LsoaRecord {
            lsoa_code,
            lsoa_name: field(1),
            msoa_code: field(2),
            msoa_name: field(3),
            lad_code: field(4),
            lad_name: field(5),
        });
    }

    Ok(map)
}
