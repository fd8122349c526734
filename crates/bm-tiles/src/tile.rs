//! Tile identity and descriptors.

use std::fmt;

use bm_core::BoundingBox;

/// One of the four children of a quadtree tile, numbered the way tile image
/// names encode them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Quadrant {
    UpperLeft = 1,
    UpperRight = 2,
    LowerLeft = 3,
    LowerRight = 4,
}

impl Quadrant {
    /// Child order used everywhere a tile's children are listed.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UpperLeft,
        Quadrant::UpperRight,
        Quadrant::LowerLeft,
        Quadrant::LowerRight,
    ];

    #[inline]
    pub fn digit(self) -> char {
        (b'0' + self as u8) as char
    }

    /// The part of `parent` this quadrant covers.  The four quadrants of a
    /// box share its midpoint lines and together cover it exactly.
    pub fn bbox(self, parent: &BoundingBox) -> BoundingBox {
        let (mid_lon, mid_lat) = parent.midpoint();
        match self {
            Quadrant::UpperLeft => BoundingBox::new(parent.ul_lon, parent.ul_lat, mid_lon, mid_lat),
            Quadrant::UpperRight => BoundingBox::new(mid_lon, parent.ul_lat, parent.lr_lon, mid_lat),
            Quadrant::LowerLeft => BoundingBox::new(parent.ul_lon, mid_lat, mid_lon, parent.lr_lat),
            Quadrant::LowerRight => BoundingBox::new(mid_lon, mid_lat, parent.lr_lon, parent.lr_lat),
        }
    }
}

/// Path-encoded tile identifier: one quadrant digit per level below the
/// root.  Empty for the root, so `path.depth()` is the tile's depth.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TilePath(String);

impl TilePath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Path of the given child of this tile.
    pub fn child(&self, q: Quadrant) -> Self {
        let mut s = String::with_capacity(self.0.len() + 1);
        s.push_str(&self.0);
        s.push(q.digit());
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn depth(&self) -> u8 {
        self.0.len() as u8
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Stem of the tile's image file: the path digits, or `"root"` for the
    /// root tile.
    pub fn image_name(&self) -> &str {
        if self.is_root() { "root" } else { &self.0 }
    }
}

impl fmt::Display for TilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.image_name())
    }
}

/// Read-only description of one tile, as returned by queries.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileDescriptor {
    pub path: TilePath,
    pub bbox: BoundingBox,
    /// 0 for the root.
    pub depth: u8,
}

impl TileDescriptor {
    /// Degrees of longitude covered by one pixel of this tile's image.
    #[inline]
    pub fn lon_dpp(&self, tile_size_px: u32) -> f64 {
        self.bbox.width() / tile_size_px as f64
    }
}
