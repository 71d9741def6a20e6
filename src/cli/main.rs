//! Command line front end for the geokit lookups.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use geokit::boundary::{convert_string_to_boundary, write_boundary};
use geokit::geocode::{convert_coordinates_to_address, convert_string_to_coordinates};
use geokit::ons::{convert_list_to_uk_geog, convert_string_to_uk_geog};
use geokit::{Config, GeographyTable, NominatimClient, OutputGeog, OverpassClient};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "geokit")]
#[command(about = "Geocoding and boundary lookups over OpenStreetMap and ONS data")]
struct Args {
    /// TOML config file (service URLs, delays, clustering precision)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Boundary polygons (GeoJSON) or boundary nodes (CSV) of a named place
    Boundary {
        /// Country name as tagged in OSM, e.g. "United Kingdom"
        #[arg(long)]
        country: String,

        /// Place name
        #[arg(long)]
        location: String,

        /// Write the raw boundary node coordinates instead of polygons
        #[arg(long)]
        coordinates: bool,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// LSOA / MSOA / LA codes covering one UK place
    UkGeog {
        /// Place name, e.g. "Bath"
        #[arg(long)]
        location: String,

        #[command(flatten)]
        files: OnsFiles,
    },

    /// LSOA / MSOA / LA codes for a list of UK places (one per line)
    UkGeogList {
        /// Text file with one place name per line
        #[arg(long)]
        locations: PathBuf,

        #[command(flatten)]
        files: OnsFiles,
    },

    /// Geocode a CSV with a LOCATIONS column to coordinates
    Geocode {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Text appended to every query, e.g. "United Kingdom"
        #[arg(long, default_value = "")]
        append: String,
    },

    /// Reverse geocode a location,lat,long CSV to addresses
    Reverse {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct OnsFiles {
    /// LSOA boundary GeoJSON (WGS84)
    #[arg(long)]
    boundaries: PathBuf,

    /// OA-LSOA-MSOA-LAD lookup CSV
    #[arg(long)]
    lookup: PathBuf,

    /// lsoa, msoa, la, overview or raw
    #[arg(long, default_value = "overview", value_parser = parse_output_geog)]
    output_geog: OutputGeog,

    /// Output CSV
    #[arg(short, long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose {
        "geokit=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    match args.command {
        Command::Boundary {
            country,
            location,
            coordinates,
            output,
        } => {
            let client = OverpassClient::new(&config.overpass)?;
            let result = convert_string_to_boundary(
                &client,
                &country,
                &location,
                !coordinates,
                config.clustering.geohash_precision,
            )
            .await?;

            write_boundary(&result, create_output(&output)?)?;
            info!("Wrote {} rows to {}", result.len(), output.display());
        }
        Command::UkGeog { location, files } => {
            let client = OverpassClient::new(&config.overpass)?;
            let table = convert_string_to_uk_geog(
                &client,
                &location,
                &files.boundaries,
                &files.lookup,
                files.output_geog,
                config.clustering.geohash_precision,
            )
            .await?;
            write_table(&table, &files.output)?;
        }
        Command::UkGeogList { locations, files } => {
            let content = fs::read_to_string(&locations)
                .with_context(|| format!("Failed to read {}", locations.display()))?;
            let locations: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
            let client = OverpassClient::new(&config.overpass)?;
            let table = convert_list_to_uk_geog(
                &client,
                &locations,
                &files.boundaries,
                &files.lookup,
                files.output_geog,
                config.clustering.geohash_precision,
            )
            .await?;
            write_table(&table, &files.output)?;
        }
        Command::Geocode {
            input,
            output,
            append,
        } => {
            let client = NominatimClient::new(&config.nominatim)?;
            convert_string_to_coordinates(
                &client,
                &input,
                &output,
                &append,
                config.nominatim.delay(),
            )
            .await?;
        }
        Command::Reverse { input, output } => {
            let client = NominatimClient::new(&config.nominatim)?;
            convert_coordinates_to_address(&client, &input, &output, config.nominatim.delay())
                .await?;
        }
    }

    Ok(())
}

fn parse_output_geog(s: &str) -> std::result::Result<OutputGeog, String> {
    s.parse().map_err(|e: geokit::GeoError| e.to_string())
}

fn write_table(table: &GeographyTable, path: &Path) -> Result<()> {
    table.write_csv(create_output(path)?)?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
