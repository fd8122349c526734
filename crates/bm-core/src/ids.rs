//! Identifier types.
//!
//! Two kinds of node identity coexist:
//!
//! - [`OsmId`] is the identifier carried by the source map data.  It is
//!   stable across loads and is what callers see in route results.
//! - [`NodeId`] is a dense index into the graph's SoA arrays, assigned at
//!   build time in ascending `OsmId` order.  It is only meaningful for the
//!   `RoadGraph` that produced it.

use std::fmt;
use std::str::FromStr;

use crate::BmError;

/// Dense index of a surviving road-graph node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel meaning "no valid node".
    pub const INVALID: NodeId = NodeId(u32::MAX);

    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for NodeId {
    /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
    #[inline(always)]
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Identifier of an intersection as it appears in the source map data.
///
/// OSM ids are signed 64-bit integers.  Text input is validated on parse:
/// anything that is not a base-10 integer within `i64` range is rejected
/// rather than truncated.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OsmId(pub i64);

impl fmt::Display for OsmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OsmId {
    type Err = BmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(OsmId)
            .map_err(|e| BmError::Parse(format!("invalid node id {s:?}: {e}")))
    }
}

impl From<i64> for OsmId {
    #[inline]
    fn from(raw: i64) -> Self {
        OsmId(raw)
    }
}
