//! The route currently shown on the map.
//!
//! Route requests write it and raster requests read it to draw the overlay.
//! Both run concurrently, so the slot holds an immutable [`RouteSnapshot`]
//! behind an [`ArcSwap`]:
//!
//! ```text
//! route()       → build new snapshot → rcu swap (version + 1)
//! clear_route() → empty snapshot     → rcu swap (version + 1)
//! raster()      → load_full()        → Arc<RouteSnapshot>, never partial
//! ```
//!
//! Readers never block writers and never observe a half-written route.

use std::sync::Arc;

use arc_swap::ArcSwap;

use bm_core::{GeoPoint, OsmId};

/// One immutable version of the current route.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteSnapshot {
    /// Incremented by every replace or clear.  0 for the initial empty
    /// route.
    pub version: u64,
    /// Node identifiers from start to goal.
    pub nodes: Vec<OsmId>,
    /// Coordinates of `nodes`, same length and order.
    pub points: Vec<GeoPoint>,
}

impl RouteSnapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Shared, atomically replaced slot for the displayed route.
pub struct CurrentRoute {
    slot: ArcSwap<RouteSnapshot>,
}

impl CurrentRoute {
    pub fn new() -> Self {
        Self { slot: ArcSwap::from_pointee(RouteSnapshot::default()) }
    }

    /// Consistent snapshot of the current route.
    pub fn load(&self) -> Arc<RouteSnapshot> {
        self.slot.load_full()
    }

    pub fn version(&self) -> u64 {
        self.slot.load().version
    }

    pub fn is_empty(&self) -> bool {
        self.slot.load().is_empty()
    }

    /// Install a new route and return its version.
    ///
    /// `nodes` and `points` must be parallel.  Concurrent replacements are
    /// serialised by the compare-and-swap loop, so every caller gets a
    /// distinct version.
    pub fn replace(&self, nodes: Vec<OsmId>, points: Vec<GeoPoint>) -> u64 {
        debug_assert_eq!(nodes.len(), points.len());
        let prev = self.slot.rcu(|cur| RouteSnapshot {
            version: cur.version + 1,
            nodes: nodes.clone(),
            points: points.clone(),
        });
        prev.version + 1
    }

    /// Replace the route with an empty one and return the new version.
    pub fn clear(&self) -> u64 {
        self.replace(Vec::new(), Vec::new())
    }
}

impl Default for CurrentRoute {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CurrentRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snap = self.slot.load();
        f.debug_struct("CurrentRoute")
            .field("version", &snap.version)
            .field("len", &snap.len())
            .finish()
    }
}
