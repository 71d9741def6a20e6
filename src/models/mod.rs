//! Core data models shared by the lookups.

pub mod element;
pub mod geocode;
pub mod geography;

pub use element::{BoundaryNode, BoundaryPolygon, ElementType, OverpassElement, RelationMember};
pub use geocode::{AddressRecord, CoordinateInput, CoordinateRecord, GeocodedPlace};
pub use geography::{
    GeographyTable, LaRow, LsoaRecord, LsoaRow, MsoaRow, OutputGeog, OverviewRow, RawJoinRow,
};
