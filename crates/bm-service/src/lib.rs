//! `bm-service` — the request layer of the map server.
//!
//! Ties the road graph and the tile index together behind three requests:
//!
//! | Request       | Method                      | Effect on current route |
//! |---------------|-----------------------------|-------------------------|
//! | raster        | [`MapService::raster`]      | read (overlay)          |
//! | route         | [`MapService::route`]       | replaced                |
//! | clear route   | [`MapService::clear_route`] | emptied                 |
//!
//! # Crate layout
//!
//! | Module            | Contents                                             |
//! |-------------------|------------------------------------------------------|
//! | [`service`]       | `MapService`                                         |
//! | [`request`]       | `RasterRequest`, `RouteRequest`, parameter parsing   |
//! | [`raster`]        | `RasterPlan` layout, `RasterResponse`                |
//! | [`current_route`] | `CurrentRoute` (`ArcSwap` slot), `RouteSnapshot`     |
//! | [`error`]         | `ServiceError`, `ServiceResult<T>`                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on requests and responses. |

pub mod current_route;
pub mod error;
pub mod raster;
pub mod request;
pub mod service;

#[cfg(test)]
mod tests;

pub use current_route::{CurrentRoute, RouteSnapshot};
pub use error::{ServiceError, ServiceResult};
pub use raster::{RasterPlan, RasterResponse, TilePlacement, tile_file_name};
pub use request::{Params, RasterRequest, RouteRequest};
pub use service::MapService;
