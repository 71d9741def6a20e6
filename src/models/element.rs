//! Overpass elements and the boundary shapes derived from them.

use geo::Polygon;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of OSM element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementType::Node => write!(f, "node"),
            ElementType::Way => write!(f, "way"),
            ElementType::Relation => write!(f, "relation"),
        }
    }
}

/// Member reference of a relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationMember {
    #[serde(rename = "type")]
    pub member_type: ElementType,
    #[serde(rename = "ref")]
    pub member_ref: i64,
    #[serde(default)]
    pub role: String,
}

/// A single element from an Overpass `out body` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,

    pub id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,

    /// Node refs (ways only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<i64>,

    /// Members (relations only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<RelationMember>,
}

impl OverpassElement {
    pub fn is_tagged(&self) -> bool {
        self.tags.is_some()
    }
}

/// An untagged node of a boundary relation, labelled with its geohash cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub geohash: String,
}

/// A cluster of boundary nodes sharing a geohash cell, as its convex hull
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    pub geohash: String,
    /// Type of the first element in the cluster
    pub element_type: ElementType,
    /// Number of nodes dissolved into this polygon
    pub node_count: usize,
    pub polygon: Polygon<f64>,
}
