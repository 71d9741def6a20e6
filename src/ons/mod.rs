//! UK statistical geographies (ONS LSOA / MSOA / LAD).
//!
//! Joins the clustered boundary of a place against locally downloaded LSOA
//! polygons and maps the hits to their parent MSOA and local authority.
//!
//! Expected downloads:
//! - LSOA Dec 2021 boundaries (full clipped, EW) as GeoJSON in WGS84
//! - OA → LSOA → MSOA → LEP → LAD Dec 2022 lookup as CSV

mod boundaries;
mod index;
mod join;
mod lookup;
mod resolver;

pub use boundaries::{load_lsoa_boundaries, LsoaBoundary, LSOA_CODE_PROPERTY};
pub use index::{LsoaArea, LsoaIndex};
pub use join::{spatial_join, summarise, JoinHit};
pub use lookup::load_lookup;
pub use resolver::{
    convert_list_to_uk_geog, convert_string_to_uk_geog, resolve_all, UkGeographyResolver,
    UK_COUNTRY,
};
