//! Map configuration.

use crate::{BmError, BmResult, BoundingBox};

/// Upper-left latitude of the scraped Berkeley root tile.
pub const ROOT_ULLAT: f64 = 37.892195547244356;
/// Upper-left longitude of the scraped Berkeley root tile.
pub const ROOT_ULLON: f64 = -122.2998046875;
/// Lower-right latitude of the scraped Berkeley root tile.
pub const ROOT_LRLAT: f64 = 37.82280243352756;
/// Lower-right longitude of the scraped Berkeley root tile.
pub const ROOT_LRLON: f64 = -122.2119140625;

/// Deepest tree the eager quadtree is allowed to materialise.
/// Depth 10 is already ~1.4 M tiles.
pub const MAX_SUPPORTED_DEPTH: u8 = 10;

/// Top-level map configuration.
///
/// Typically assembled by the application crate from CLI flags or a config
/// file and handed to `MapService`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapConfig {
    /// Bounding box covered by the root tile.
    pub root: BoundingBox,

    /// Edge length of every tile image in pixels.  Uniform across the tree.
    pub tile_size_px: u32,

    /// Deepest quadtree level.  Tiles at this depth have no children.
    pub max_depth: u8,

    /// Stroke width used when the image backend draws the route overlay.
    pub route_stroke_width_px: f32,
}

impl MapConfig {
    /// Reject configurations the tile index cannot be built from.
    pub fn validate(&self) -> BmResult<()> {
        if !self.root.is_finite() || self.root.width() <= 0.0 || self.root.height() <= 0.0 {
            return Err(BmError::Config(format!(
                "root bounding box must be finite with positive extent, got {:?}",
                self.root
            )));
        }
        if self.tile_size_px == 0 {
            return Err(BmError::Config("tile_size_px must be non-zero".into()));
        }
        if self.max_depth > MAX_SUPPORTED_DEPTH {
            return Err(BmError::Config(format!(
                "max_depth {} exceeds supported maximum {MAX_SUPPORTED_DEPTH}",
                self.max_depth
            )));
        }
        // A full row of deepest tiles must fit in a u32 pixel width.
        let mosaic_px = u64::from(self.tile_size_px) << self.max_depth;
        if mosaic_px > u64::from(u32::MAX) {
            return Err(BmError::Config(format!(
                "tile_size_px {} at max_depth {} gives a {mosaic_px} px mosaic, above u32::MAX",
                self.tile_size_px, self.max_depth
            )));
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            root: BoundingBox::new(ROOT_ULLON, ROOT_ULLAT, ROOT_LRLON, ROOT_LRLAT),
            tile_size_px: 256,
            max_depth: 7,
            route_stroke_width_px: 5.0,
        }
    }
}
