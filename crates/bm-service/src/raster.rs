//! Tile layout and route projection for one raster response.
//!
//! The image backend (out of scope here) stitches tile PNGs into a single
//! image.  [`RasterPlan`] tells it where each tile goes and where to draw
//! the route polyline; pixel (0, 0) is the upper-left corner of the first
//! tile.
//!
//! Tiles at one depth form a regular grid, so the selection is always a
//! full rectangle of `rows × cols` tiles.

use bm_core::{BoundingBox, GeoPoint};
use bm_tiles::{TilePath, TileSelection};

/// File extension of tile images.
pub const TILE_IMAGE_EXT: &str = "png";

/// File name of a tile image, e.g. `"root.png"` or `"1432.png"`.
pub fn tile_file_name(path: &TilePath) -> String {
    format!("{}.{TILE_IMAGE_EXT}", path.image_name())
}

/// Where one tile goes in the stitched raster.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePlacement {
    pub path: TilePath,
    pub x_px: u32,
    pub y_px: u32,
}

/// Pixel layout of a raster response.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterPlan {
    /// Geographic extent of the stitched image.
    pub bounds: BoundingBox,
    pub depth: u8,
    pub width_px: u32,
    pub height_px: u32,
    /// Row-major, same order as the selection.
    pub placements: Vec<TilePlacement>,
    /// Route coordinates projected into raster pixels.
    pub route_overlay: Vec<(f64, f64)>,
}

impl RasterPlan {
    /// Lay out `selection` on a grid of `tile_size_px` squares and project
    /// `route` onto it.  `None` if the selection is empty or the stitched
    /// image would be wider or taller than `u32::MAX` pixels.
    pub fn from_selection(
        selection: &TileSelection,
        tile_size_px: u32,
        route: &[GeoPoint],
    ) -> Option<Self> {
        let bounds = selection.bounds()?;
        let rows = selection.rows();
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let width_px = u32::try_from(cols).ok()?.checked_mul(tile_size_px)?;
        let height_px = u32::try_from(rows.len()).ok()?.checked_mul(tile_size_px)?;

        let mut placements = Vec::with_capacity(selection.len());
        for (r, row) in rows.iter().enumerate() {
            for (c, tile) in row.iter().enumerate() {
                placements.push(TilePlacement {
                    path: tile.path.clone(),
                    x_px: c as u32 * tile_size_px,
                    y_px: r as u32 * tile_size_px,
                });
            }
        }

        let mut plan = Self {
            bounds,
            depth: selection.depth,
            width_px,
            height_px,
            placements,
            route_overlay: Vec::new(),
        };
        plan.route_overlay = route.iter().map(|&p| plan.project(p)).collect();
        Some(plan)
    }

    /// Map a coordinate into raster pixels.  Points outside the bounds
    /// project outside `0..width_px` / `0..height_px`; clipping is left to
    /// the drawing backend.
    pub fn project(&self, p: GeoPoint) -> (f64, f64) {
        let lon_per_px = self.bounds.width() / self.width_px as f64;
        let lat_per_px = self.bounds.height() / self.height_px as f64;
        (
            (p.lon - self.bounds.ul_lon) / lon_per_px,
            (self.bounds.ul_lat - p.lat) / lat_per_px,
        )
    }

    /// Tile image file names in placement order.
    pub fn file_names(&self) -> Vec<String> {
        self.placements.iter().map(|t| tile_file_name(&t.path)).collect()
    }
}

// ── RasterResponse ────────────────────────────────────────────────────────────

/// What a raster request returns to the transport.  Field names are the
/// wire keys.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterResponse {
    pub raster_ul_lon: f64,
    pub raster_ul_lat: f64,
    pub raster_lr_lon: f64,
    pub raster_lr_lat: f64,
    pub raster_width: u32,
    pub raster_height: u32,
    pub depth: u8,
    /// Tile image file names, row-major.
    pub tiles: Vec<String>,
    /// `false` when no tile overlaps the query.  Every other field is then
    /// zero or empty.
    pub query_success: bool,
    /// Pixel polyline of the current route.
    pub route_overlay: Vec<[f64; 2]>,
}

impl RasterResponse {
    pub fn failure() -> Self {
        Self::default()
    }
}

impl From<RasterPlan> for RasterResponse {
    fn from(plan: RasterPlan) -> Self {
        Self {
            raster_ul_lon: plan.bounds.ul_lon,
            raster_ul_lat: plan.bounds.ul_lat,
            raster_lr_lon: plan.bounds.lr_lon,
            raster_lr_lat: plan.bounds.lr_lat,
            raster_width: plan.width_px,
            raster_height: plan.height_px,
            depth: plan.depth,
            tiles: plan.file_names(),
            query_success: true,
            route_overlay: plan.route_overlay.iter().map(|&(x, y)| [x, y]).collect(),
        }
    }
}
