//! Boundary queries against the Overpass API.

mod client;
mod query;

pub use client::OverpassClient;
pub use query::build_boundary_query;
