//! `bm-tiles` — quadtree over the pre-rendered map tiles.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`tile`]     | `TilePath`, `Quadrant`, `TileDescriptor`                  |
//! | [`quadtree`] | `TileIndex` (eager arena), `TileSelection`                |
//! | [`error`]    | `TileError`, `TileResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod quadtree;
pub mod tile;


pub use error::{TileError, TileResult};
pub use quadtree::{TileIndex, TileSelection};
pub use tile::{Quadrant, TileDescriptor, TilePath};
