//! Graph-subsystem error type.
//!
//! Every variant here is a construction-time failure.  Query-time outcomes
//! such as an unreachable goal are empty routes, not errors.

use thiserror::Error;

use bm_core::OsmId;

/// Errors produced by `bm-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {id} has invalid coordinates (lat {lat}, lon {lon})")]
    InvalidCoordinate { id: OsmId, lat: f64, lon: f64 },

    #[error("node {0} defined more than once")]
    DuplicateNode(OsmId),

    #[error("malformed node element: {0}")]
    MalformedNode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(any(feature = "osm-xml", feature = "osm-pbf"))]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
