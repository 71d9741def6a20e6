//! UK place names to LSOA / MSOA / LA codes.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, warn};

use super::boundaries::load_lsoa_boundaries;
use super::index::LsoaIndex;
use super::join::{spatial_join, summarise};
use super::lookup::load_lookup;
use crate::boundary::{cluster_nodes, fetch_boundary_nodes};
use crate::error::Result;
use crate::models::{GeographyTable, OutputGeog};
use crate::overpass::OverpassClient;

/// Country area every UK lookup is restricted to
pub const UK_COUNTRY: &str = "United Kingdom";

/// Holds the LSOA boundaries and lookup table in memory so several
/// locations can be resolved against one load
pub struct UkGeographyResolver {
    index: LsoaIndex,
    precision: usize,
}

impl UkGeographyResolver {
    pub fn new(index: LsoaIndex, precision: usize) -> Self {
        Self { index, precision }
    }

    /// Load the boundary file and lookup table
    pub fn load(boundary_path: &Path, lookup_path: &Path, precision: usize) -> Result<Self> {
        let boundaries = load_lsoa_boundaries(boundary_path)?;
        let lookup = load_lookup(lookup_path)?;
        Ok(Self::new(LsoaIndex::build(boundaries, &lookup), precision))
    }

    /// Resolve one location to the requested geography
    pub async fn resolve(
        &self,
        client: &OverpassClient,
        location: &str,
        output: OutputGeog,
    ) -> Result<GeographyTable> {
        let nodes = fetch_boundary_nodes(client, UK_COUNTRY, location, self.precision).await?;
        let polygons = cluster_nodes(&nodes);

        info!(
            "There are {} polygons in the input location '{}'",
            polygons.len(),
            location
        );
        for p in &polygons {
            debug!("  {} ({} nodes)", p.geohash, p.node_count);
        }

        info!("Performing spatial join...");
        let hits = spatial_join(&self.index, &polygons);
        let table = summarise(&hits, location, output)?;
        info!("'{}' matched {} {} rows", location, table.len(), output);

        Ok(table)
    }

    pub fn index(&self) -> &LsoaIndex {
        &self.index
    }
}

/// Convert a single UK place name to LSOA / MSOA / LA codes.
///
/// Only England and Wales are covered by the LSOA files. Errors from the
/// boundary query or the files propagate.
pub async fn convert_string_to_uk_geog(
    client: &OverpassClient,
    location: &str,
    boundary_path: &Path,
    lookup_path: &Path,
    output: OutputGeog,
    precision: usize,
) -> Result<GeographyTable> {
    let resolver = UkGeographyResolver::load(boundary_path, lookup_path, precision)?;
    resolver.resolve(client, location, output).await
}

/// Convert many UK place names, loading the files once.
///
/// A location that fails (usually because it has no boundary relation) is
/// logged and skipped; the rest are concatenated in input order.
pub async fn convert_list_to_uk_geog(
    client: &OverpassClient,
    locations: &[String],
    boundary_path: &Path,
    lookup_path: &Path,
    output: OutputGeog,
    precision: usize,
) -> Result<GeographyTable> {
    let resolver = UkGeographyResolver::load(boundary_path, lookup_path, precision)?;
    Ok(resolve_all(&resolver, client, locations, output).await)
}

/// Resolve every location sequentially, skipping failures
pub async fn resolve_all(
    resolver: &UkGeographyResolver,
    client: &OverpassClient,
    locations: &[String],
    output: OutputGeog,
) -> GeographyTable {
    let mut all_results = GeographyTable::empty(output);

    let pb = ProgressBar::new(locations.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    for location in locations {
        pb.set_message(location.clone());

        match resolver.resolve(client, location, output).await {
            Ok(table) => all_results.extend(table),
            Err(e) => warn!("Error. Likely no polygons found for {}: {}", location, e),
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Resolved {} locations into {} rows",
        locations.len(),
        all_results.len()
    );

    all_results
}
