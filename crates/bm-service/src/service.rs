//! The `MapService` request façade.

use std::sync::Arc;

use tracing::{debug, info};

use bm_core::{MapConfig, OsmId};
use bm_graph::{AStarRouter, RoadGraph, Router};
use bm_tiles::TileIndex;

use crate::current_route::{CurrentRoute, RouteSnapshot};
use crate::raster::{RasterPlan, RasterResponse};
use crate::request::{Params, RasterRequest, RouteRequest};
use crate::ServiceResult;

/// Answers raster, route and clear-route requests against one loaded map.
///
/// Everything except the current route is immutable after construction,
/// so a single `MapService` can be shared across request threads behind an
/// `Arc` (or by reference in a scoped pool).
///
/// # Example
///
/// ```rust,ignore
/// let graph = bm_graph::osm::load_from_xml_path(path)?;
/// let service = MapService::new(MapConfig::default(), graph)?;
///
/// let ids = service.route(&RouteRequest::new(start, end));
/// let raster = service.raster(&RasterRequest::new(bbox, 1024, 768))?;
/// assert_eq!(raster.route_overlay.len(), ids.len());
/// ```
pub struct MapService<R: Router = AStarRouter> {
    config: MapConfig,
    graph: Arc<RoadGraph>,
    tiles: TileIndex,
    router: R,
    current: CurrentRoute,
}

impl MapService<AStarRouter> {
    /// Service with the default A* router.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Tiles`](crate::ServiceError::Tiles) if `config` fails
    /// validation.
    pub fn new(config: MapConfig, graph: impl Into<Arc<RoadGraph>>) -> ServiceResult<Self> {
        Self::with_router(config, graph, AStarRouter)
    }
}

impl<R: Router> MapService<R> {
    /// Service with a caller-supplied router.
    pub fn with_router(
        config: MapConfig,
        graph: impl Into<Arc<RoadGraph>>,
        router: R,
    ) -> ServiceResult<Self> {
        let graph = graph.into();
        let tiles = TileIndex::new(&config)?;
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            tiles = tiles.len(),
            max_depth = config.max_depth,
            "map service ready"
        );
        Ok(Self { config, graph, tiles, router, current: CurrentRoute::new() })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn graph(&self) -> &RoadGraph {
        &self.graph
    }

    pub fn tiles(&self) -> &TileIndex {
        &self.tiles
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Snapshot of the route currently drawn on rasters.
    pub fn current_route(&self) -> Arc<RouteSnapshot> {
        self.current.load()
    }

    // ── Requests ──────────────────────────────────────────────────────────

    /// Select, lay out and annotate the tiles covering `req`.
    ///
    /// A query that misses the map entirely is not an error: the response
    /// has `query_success == false`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Tiles`](crate::ServiceError::Tiles) for a degenerate
    /// or non-finite box.
    pub fn raster(&self, req: &RasterRequest) -> ServiceResult<RasterResponse> {
        let selection = self.tiles.select_tiles(&req.bbox, req.width_px)?;
        let route = self.current.load();
        let response = match RasterPlan::from_selection(&selection, self.config.tile_size_px, &route.points) {
            Some(plan) => RasterResponse::from(plan),
            None => RasterResponse::failure(),
        };
        debug!(
            depth = response.depth,
            tiles = response.tiles.len(),
            route_version = route.version,
            success = response.query_success,
            "raster"
        );
        Ok(response)
    }

    /// [`raster`](Self::raster) from raw transport parameters.
    pub fn raster_params(&self, params: &Params) -> ServiceResult<RasterResponse> {
        self.raster(&RasterRequest::from_params(params)?)
    }

    /// Shortest path between the intersections nearest `req.start` and
    /// `req.end`, as node identifiers.
    ///
    /// The result becomes the current route, including when it is empty.
    pub fn route(&self, req: &RouteRequest) -> Vec<OsmId> {
        let route = self.router.find_path(&self.graph, req.start, req.end);
        let ids = route.osm_ids(&self.graph);
        let version = self.current.replace(ids.clone(), route.points(&self.graph));
        debug!(
            nodes = ids.len(),
            length_m = route.length_m(&self.graph),
            version,
            "route"
        );
        ids
    }

    /// [`route`](Self::route) from raw transport parameters.
    pub fn route_params(&self, params: &Params) -> ServiceResult<Vec<OsmId>> {
        Ok(self.route(&RouteRequest::from_params(params)?))
    }

    /// Forget the current route.
    pub fn clear_route(&self) {
        let version = self.current.clear();
        debug!(version, "route cleared");
    }
}
