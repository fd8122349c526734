//! `bm-graph` — road graph, nearest-node snapping, and routing.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`graph`]      | `RoadGraph` (CSR + R-tree), `RoadGraphBuilder`           |
//! | [`pathfinder`] | `Router` trait, `Route`, `AStarRouter`                   |
//! | [`osm`]        | highway filter, `load_from_xml` / `load_from_pbf`        |
//! | [`error`]      | `GraphError`, `GraphResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `osm-xml`  | Enables OSM XML loading via `quick-xml`.                 |
//! | `osm-pbf`  | Enables OSM PBF loading via `osmpbf`.                    |
//! | `parallel` | Enables `find_paths_par` (Rayon batch routing).          |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.       |

pub mod error;
pub mod graph;
pub mod osm;
pub mod pathfinder;


pub use error::{GraphError, GraphResult};
pub use graph::{NodeRef, RoadGraph, RoadGraphBuilder};
pub use pathfinder::{AStarRouter, Route, Router};

#[cfg(feature = "parallel")]
pub use pathfinder::find_paths_par;
