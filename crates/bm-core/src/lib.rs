//! `bm-core` — foundational types for the bearmaps workspace.
//!
//! Every other `bm-*` crate depends on this one.  It has no `bm-*`
//! dependencies and a single required external one (`thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId` (dense index), `OsmId` (source identifier)   |
//! | [`geo`]         | `GeoPoint`, `BoundingBox`, Euclidean/haversine helpers |
//! | [`config`]      | `MapConfig` and the Berkeley root constants           |
//! | [`error`]       | `BmError`, `BmResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::MapConfig;
pub use error::{BmError, BmResult};
pub use geo::{BoundingBox, GeoPoint};
pub use ids::{NodeId, OsmId};
