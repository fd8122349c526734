//! Eagerly materialised quadtree over the map tiles.
//!
//! # Data layout
//!
//! The tree is stored as a flat arena: `tiles[0]` is the root and every
//! interior node records the arena indices of its four children in
//! [`Quadrant::ALL`] order.  Leaves sit at exactly `max_depth`.  For the
//! default depth of 7 the arena holds `(4^8 - 1) / 3 = 21 845` tiles.
//!
//! # Queries
//!
//! A raster request is answered in two steps:
//!
//! 1. [`TileIndex::select_depth`] picks the shallowest depth whose tiles
//!    have a longitudinal resolution at least as fine as the request's.
//! 2. [`TileIndex::intersecting`] collects every tile at that depth that
//!    overlaps the request box, ordered for row-major assembly.

use std::cmp::Ordering;

use tracing::debug;

use bm_core::{BoundingBox, MapConfig};

use crate::{Quadrant, TileDescriptor, TileError, TilePath, TileResult};

const ROOT: usize = 0;

struct TileNode {
    desc: TileDescriptor,
    children: Option<[u32; 4]>,
}

/// Immutable quadtree over the root bounding box.
///
/// Build once with [`TileIndex::new`] and share by reference; every query
/// takes `&self`.
pub struct TileIndex {
    tiles: Vec<TileNode>,
    tile_size_px: u32,
    max_depth: u8,
}

impl TileIndex {
    /// Build the full tree described by `config`.
    ///
    /// # Errors
    ///
    /// [`TileError::Config`] if the configuration fails validation.
    pub fn new(config: &MapConfig) -> TileResult<Self> {
        config.validate()?;

        let levels = config.max_depth as u32 + 1;
        let capacity = (4usize.pow(levels) - 1) / 3;
        let mut tiles = Vec::with_capacity(capacity);
        grow(&mut tiles, TilePath::root(), config.root, config.max_depth);
        debug_assert_eq!(tiles.len(), capacity);

        debug!(tiles = tiles.len(), max_depth = config.max_depth, "tile index built");
        Ok(Self { tiles, tile_size_px: config.tile_size_px, max_depth: config.max_depth })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn root(&self) -> &TileDescriptor {
        &self.tiles[ROOT].desc
    }

    /// Total number of tiles in the tree.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn tile_size_px(&self) -> u32 {
        self.tile_size_px
    }

    /// Look a tile up by its path.  `None` for a path with a digit outside
    /// `1..=4` or deeper than the tree.
    pub fn get(&self, path: &TilePath) -> Option<&TileDescriptor> {
        let mut idx = ROOT;
        for ch in path.as_str().chars() {
            let slot = match ch {
                '1'..='4' => ch as usize - '1' as usize,
                _ => return None,
            };
            idx = self.tiles[idx].children?[slot] as usize;
        }
        Some(&self.tiles[idx].desc)
    }

    /// Direct children of a tile, in quadrant order.  Empty at the maximum
    /// depth.
    pub fn children(&self, path: &TilePath) -> Vec<&TileDescriptor> {
        let mut idx = ROOT;
        for ch in path.as_str().chars() {
            let Some(children) = self.tiles[idx].children else { return Vec::new() };
            match ch {
                '1'..='4' => idx = children[ch as usize - '1' as usize] as usize,
                _ => return Vec::new(),
            }
        }
        self.tiles[idx]
            .children
            .map(|c| c.iter().map(|&i| &self.tiles[i as usize].desc).collect())
            .unwrap_or_default()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Depth whose tiles are the coarsest that still resolve at least
    /// `query.width() / width_px` degrees of longitude per pixel.
    ///
    /// Walks down from the root and stops at the first level fine enough,
    /// or at the maximum depth if none is.
    ///
    /// # Errors
    ///
    /// [`TileError::InvalidQuery`] for a non-finite or zero-area box, or a
    /// zero `width_px`.
    pub fn select_depth(&self, query: &BoundingBox, width_px: u32) -> TileResult<u8> {
        validate_box(query)?;
        if width_px == 0 {
            return Err(TileError::InvalidQuery("pixel width must be non-zero".into()));
        }
        let query_dpp = query.width() / width_px as f64;

        let mut idx = ROOT;
        loop {
            let node = &self.tiles[idx];
            if node.desc.lon_dpp(self.tile_size_px) <= query_dpp {
                return Ok(node.desc.depth);
            }
            match node.children {
                Some(children) => idx = children[0] as usize,
                None => return Ok(node.desc.depth),
            }
        }
    }

    /// Every tile at `depth` (capped at the maximum depth) that overlaps
    /// `query`, ordered north to south and, within a row, west to east.
    ///
    /// A box entirely outside the root yields an empty vector.
    ///
    /// # Errors
    ///
    /// [`TileError::InvalidQuery`] for a non-finite or zero-area box.
    pub fn intersecting(&self, query: &BoundingBox, depth: u8) -> TileResult<Vec<TileDescriptor>> {
        validate_box(query)?;
        let depth = depth.min(self.max_depth);

        let mut out = Vec::new();
        self.collect(ROOT, query, depth, &mut out);
        out.sort_by(row_major);
        Ok(out)
    }

    /// Depth selection followed by the intersection query.
    pub fn select_tiles(&self, query: &BoundingBox, width_px: u32) -> TileResult<TileSelection> {
        let depth = self.select_depth(query, width_px)?;
        let tiles = self.intersecting(query, depth)?;
        debug!(
            query_dpp = query.width() / width_px as f64,
            depth,
            tiles = tiles.len(),
            "tiles selected"
        );
        Ok(TileSelection { depth, tiles })
    }

    fn collect(&self, idx: usize, query: &BoundingBox, depth: u8, out: &mut Vec<TileDescriptor>) {
        let node = &self.tiles[idx];
        // Children partition the parent, so a disjoint parent has no
        // overlapping descendants.
        if !node.desc.bbox.intersects(query) {
            return;
        }
        match node.children {
            Some(children) if node.desc.depth < depth => {
                for child in children {
                    self.collect(child as usize, query, depth, out);
                }
            }
            _ => out.push(node.desc.clone()),
        }
    }
}

/// Append the subtree rooted at `bbox` in pre-order and return the root's
/// arena index.
fn grow(tiles: &mut Vec<TileNode>, path: TilePath, bbox: BoundingBox, max_depth: u8) -> u32 {
    let idx = tiles.len() as u32;
    let depth = path.depth();
    tiles.push(TileNode {
        desc: TileDescriptor { path: path.clone(), bbox, depth },
        children: None,
    });
    if depth < max_depth {
        let children = Quadrant::ALL.map(|q| grow(tiles, path.child(q), q.bbox(&bbox), max_depth));
        tiles[idx as usize].children = Some(children);
    }
    idx
}

fn validate_box(query: &BoundingBox) -> TileResult<()> {
    if !query.is_finite() {
        return Err(TileError::InvalidQuery(format!("non-finite bounding box {query:?}")));
    }
    if query.width() <= 0.0 || query.height() <= 0.0 {
        return Err(TileError::InvalidQuery(format!(
            "bounding box must have positive width and height, got {:.6} x {:.6}",
            query.width(),
            query.height()
        )));
    }
    Ok(())
}

fn row_major(a: &TileDescriptor, b: &TileDescriptor) -> Ordering {
    b.bbox
        .ul_lat
        .total_cmp(&a.bbox.ul_lat)
        .then(a.bbox.ul_lon.total_cmp(&b.bbox.ul_lon))
}

// ── TileSelection ─────────────────────────────────────────────────────────────

/// Result of [`TileIndex::select_tiles`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileSelection {
    /// Depth the tiles were taken from.
    pub depth: u8,
    /// Tiles in row-major order (north to south, west to east).
    pub tiles: Vec<TileDescriptor>,
}

impl TileSelection {
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Box spanned by the selected tiles: the first tile's upper-left
    /// corner to the last tile's lower-right corner.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let first = self.tiles.first()?;
        let last = self.tiles.last()?;
        Some(BoundingBox::new(
            first.bbox.ul_lon,
            first.bbox.ul_lat,
            last.bbox.lr_lon,
            last.bbox.lr_lat,
        ))
    }

    /// Tiles grouped into rows of equal upper latitude.
    pub fn rows(&self) -> Vec<&[TileDescriptor]> {
        self.tiles
            .chunk_by(|a, b| a.bbox.ul_lat == b.bbox.ul_lat)
            .collect()
    }
}
