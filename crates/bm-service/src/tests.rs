//! Unit tests for bm-service.

#[cfg(test)]
mod helpers {
    use std::collections::HashMap;

    use bm_core::{GeoPoint, MapConfig, OsmId};
    use bm_graph::{RoadGraph, RoadGraphBuilder};

    use crate::{MapService, Params};

    pub fn grid_id(r: i64, c: i64) -> OsmId {
        OsmId(100 + r * 3 + c)
    }

    /// 3 × 3 street grid inside the Berkeley root, 0.01° spacing, plus a
    /// two-node island to the south-east that nothing else reaches.
    ///
    /// ```text
    ///   100 ─ 101 ─ 102      lat 37.87
    ///    |     |     |
    ///   103 ─ 104 ─ 105      lat 37.86
    ///    |     |     |
    ///   106 ─ 107 ─ 108      lat 37.85
    ///
    ///                  900 ─ 901   lat 37.83
    /// ```
    pub fn town() -> RoadGraph {
        let mut b = RoadGraphBuilder::new();
        for r in 0..3 {
            for c in 0..3 {
                let p = GeoPoint::new(37.87 - r as f64 * 0.01, -122.27 + c as f64 * 0.01);
                b.add_node(grid_id(r, c), p).unwrap();
            }
        }
        for i in 0..3 {
            b.add_way(&[grid_id(i, 0), grid_id(i, 1), grid_id(i, 2)], true);
            b.add_way(&[grid_id(0, i), grid_id(1, i), grid_id(2, i)], true);
        }
        b.add_node(OsmId(900), GeoPoint::new(37.83, -122.22)).unwrap();
        b.add_node(OsmId(901), GeoPoint::new(37.83, -122.215)).unwrap();
        b.add_way(&[OsmId(900), OsmId(901)], true);
        b.build()
    }

    pub fn service() -> MapService {
        MapService::new(MapConfig::default(), town()).unwrap()
    }

    pub fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|&(k, v)| (k.to_owned(), v.to_owned())).collect::<HashMap<_, _>>()
    }
}

// ── Request parsing ───────────────────────────────────────────────────────────

#[cfg(test)]
mod requests {
    use bm_core::{BmError, GeoPoint};
    use bm_tiles::TileError;

    use super::helpers::params;
    use crate::{RasterRequest, RouteRequest, ServiceError};

    fn raster_params(w: &str) -> crate::Params {
        params(&[
            ("ullon", "-122.28"),
            ("ullat", "37.88"),
            ("lrlon", "-122.24"),
            ("lrlat", "37.84"),
            ("w", w),
            ("h", "600"),
        ])
    }

    #[test]
    fn raster_params_parse() {
        let req = RasterRequest::from_params(&raster_params("800")).unwrap();
        assert_eq!(req.bbox.ul_lon, -122.28);
        assert_eq!(req.bbox.lr_lat, 37.84);
        assert_eq!((req.width_px, req.height_px), (800, 600));
    }

    #[test]
    fn pixel_sizes_round() {
        assert_eq!(RasterRequest::from_params(&raster_params("255.6")).unwrap().width_px, 256);
        assert_eq!(RasterRequest::from_params(&raster_params(" 1.2 ")).unwrap().width_px, 1);
    }

    #[test]
    fn pixel_sizes_below_one_rejected() {
        for w in ["0", "0.4", "-3"] {
            let err = RasterRequest::from_params(&raster_params(w)).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidParam { name: "w", .. }), "{w}");
        }
    }

    #[test]
    fn missing_param_named() {
        let mut p = raster_params("800");
        p.remove("lrlat");
        let err = RasterRequest::from_params(&p).unwrap_err();
        assert!(matches!(err, ServiceError::MissingParam("lrlat")));
        assert!(err.is_client_error());
    }

    #[test]
    fn non_numeric_and_non_finite_rejected() {
        for bad in ["abc", "NaN", "inf", ""] {
            let mut p = raster_params("800");
            p.insert("ullat".into(), bad.into());
            let err = RasterRequest::from_params(&p).unwrap_err();
            match err {
                ServiceError::InvalidParam { name, value } => {
                    assert_eq!(name, "ullat");
                    assert_eq!(value, bad);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        for (name, bad) in [("ullon", "-200"), ("lrlon", "180.5"), ("ullat", "91"), ("lrlat", "-90.01")] {
            let mut p = raster_params("800");
            p.insert(name.into(), bad.into());
            let err = RasterRequest::from_params(&p).unwrap_err();
            assert!(err.is_client_error());
            match err {
                ServiceError::InvalidParam { name: got, value } => {
                    assert_eq!(got, name);
                    assert_eq!(value, bad);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn range_limits_are_inclusive() {
        let p = params(&[
            ("start_lat", "90"),
            ("start_lon", "-180"),
            ("end_lat", "-90"),
            ("end_lon", "180"),
        ]);
        let req = RouteRequest::from_params(&p).unwrap();
        assert_eq!(req.start, GeoPoint::new(90.0, -180.0));
        assert_eq!(req.end, GeoPoint::new(-90.0, 180.0));
    }

    #[test]
    fn route_endpoint_off_the_globe_rejected() {
        let p = params(&[
            ("start_lat", "500"),
            ("start_lon", "-122.27"),
            ("end_lat", "37.85"),
            ("end_lon", "-122.25"),
        ]);
        let err = RouteRequest::from_params(&p).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidParam { name: "start_lat", .. }));

        let mut q = p.clone();
        q.insert("start_lat".into(), "37.87".into());
        q.insert("end_lon".into(), "-181".into());
        let err = RouteRequest::from_params(&q).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidParam { name: "end_lon", .. }));
    }

    #[test]
    fn route_params_parse() {
        let p = params(&[
            ("start_lat", "37.87"),
            ("start_lon", "-122.27"),
            ("end_lat", "37.85"),
            ("end_lon", "-122.25"),
        ]);
        let req = RouteRequest::from_params(&p).unwrap();
        assert_eq!(req.start, GeoPoint::new(37.87, -122.27));
        assert_eq!(req.end, GeoPoint::new(37.85, -122.25));

        let mut q = p.clone();
        q.remove("end_lon");
        assert!(matches!(RouteRequest::from_params(&q), Err(ServiceError::MissingParam("end_lon"))));
    }

    #[test]
    fn client_error_classification() {
        assert!(ServiceError::Tiles(TileError::InvalidQuery("x".into())).is_client_error());
        assert!(!ServiceError::Tiles(TileError::Config(BmError::Config("x".into()))).is_client_error());
    }
}

// ── Current route ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod current_route {
    use std::thread;

    use bm_core::{GeoPoint, OsmId};

    use crate::CurrentRoute;

    #[test]
    fn starts_empty_at_version_zero() {
        let cur = CurrentRoute::new();
        assert!(cur.is_empty());
        assert_eq!(cur.version(), 0);
        assert_eq!(*cur.load(), Default::default());
    }

    #[test]
    fn replace_and_clear_bump_version() {
        let cur = CurrentRoute::new();
        let v1 = cur.replace(vec![OsmId(1), OsmId(2)], vec![GeoPoint::new(0.0, 0.0); 2]);
        assert_eq!(v1, 1);
        let snap = cur.load();
        assert_eq!(snap.nodes, vec![OsmId(1), OsmId(2)]);
        assert_eq!(snap.points.len(), 2);

        assert_eq!(cur.clear(), 2);
        assert!(cur.is_empty());
        // An earlier snapshot is unaffected by later swaps.
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.version, 1);
    }

    #[test]
    fn concurrent_replacements_get_distinct_versions() {
        let cur = CurrentRoute::new();
        let mut versions: Vec<u64> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let cur = &cur;
                    s.spawn(move || {
                        (0..50)
                            .map(|i| cur.replace(vec![OsmId(t * 100 + i)], vec![GeoPoint::new(0.0, 0.0)]))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });
        versions.sort_unstable();
        versions.dedup();
        assert_eq!(versions.len(), 400);
        assert_eq!(cur.version(), 400);
    }
}

// ── Raster layout ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod raster {
    use bm_core::{GeoPoint, MapConfig};
    use bm_tiles::{TileIndex, TilePath, TileSelection};

    use crate::{RasterPlan, RasterResponse, tile_file_name};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn file_names() {
        assert_eq!(tile_file_name(&TilePath::root()), "root.png");
        let p = TilePath::root().child(bm_tiles::Quadrant::LowerRight);
        assert_eq!(tile_file_name(&p), "4.png");
    }

    #[test]
    fn quadrants_laid_out_row_major() {
        let config = MapConfig::default();
        let idx = TileIndex::new(&config).unwrap();
        let tiles = idx.intersecting(&config.root, 1).unwrap();
        let sel = TileSelection { depth: 1, tiles };

        let plan = RasterPlan::from_selection(&sel, 256, &[]).unwrap();
        assert_eq!((plan.width_px, plan.height_px), (512, 512));
        assert_eq!(plan.depth, 1);
        let xy: Vec<(u32, u32)> = plan.placements.iter().map(|p| (p.x_px, p.y_px)).collect();
        assert_eq!(xy, vec![(0, 0), (256, 0), (0, 256), (256, 256)]);
        assert_eq!(plan.file_names(), vec!["1.png", "2.png", "3.png", "4.png"]);
        assert_eq!(plan.bounds, config.root);
    }

    #[test]
    fn oversized_mosaic_is_not_planned() {
        let config = MapConfig::default();
        let idx = TileIndex::new(&config).unwrap();
        let tiles = idx.intersecting(&config.root, 1).unwrap();
        let sel = TileSelection { depth: 1, tiles };

        assert!(RasterPlan::from_selection(&sel, 1 << 31, &[]).is_none());
        let plan = RasterPlan::from_selection(&sel, (1 << 31) - 1, &[]).unwrap();
        assert_eq!(plan.width_px, u32::MAX - 1);
        assert_eq!(plan.placements[3].x_px, (1 << 31) - 1);
    }

    #[test]
    fn projection_maps_corners_and_centre() {
        let config = MapConfig::default();
        let idx = TileIndex::new(&config).unwrap();
        let sel = idx.select_tiles(&config.root, 1_000).unwrap();
        let plan = RasterPlan::from_selection(&sel, 256, &[]).unwrap();
        let b = plan.bounds;

        let (x0, y0) = plan.project(GeoPoint::new(b.ul_lat, b.ul_lon));
        assert!(approx(x0, 0.0) && approx(y0, 0.0));
        let (x1, y1) = plan.project(GeoPoint::new(b.lr_lat, b.lr_lon));
        assert!(approx(x1, plan.width_px as f64) && approx(y1, plan.height_px as f64));
        let (mid_lon, mid_lat) = b.midpoint();
        let (xm, ym) = plan.project(GeoPoint::new(mid_lat, mid_lon));
        assert!(approx(xm, plan.width_px as f64 / 2.0));
        assert!(approx(ym, plan.height_px as f64 / 2.0));
    }

    #[test]
    fn overlay_follows_route_points() {
        let config = MapConfig::default();
        let idx = TileIndex::new(&config).unwrap();
        let sel = idx.select_tiles(&config.root, 256).unwrap();
        let (mid_lon, mid_lat) = config.root.midpoint();
        let route = [
            GeoPoint::new(config.root.ul_lat, config.root.ul_lon),
            GeoPoint::new(mid_lat, mid_lon),
        ];
        let plan = RasterPlan::from_selection(&sel, 256, &route).unwrap();
        assert_eq!(plan.route_overlay.len(), 2);
        assert!(approx(plan.route_overlay[0].0, 0.0));
        assert!(approx(plan.route_overlay[1].0, 128.0));
        assert!(approx(plan.route_overlay[1].1, 128.0));

        let resp = RasterResponse::from(plan);
        assert!(resp.query_success);
        assert_eq!(resp.tiles, vec!["root.png"]);
        assert_eq!(resp.route_overlay.len(), 2);
    }

    #[test]
    fn empty_selection_has_no_plan() {
        assert!(RasterPlan::from_selection(&TileSelection::default(), 256, &[]).is_none());
        let failed = RasterResponse::failure();
        assert!(!failed.query_success);
        assert!(failed.tiles.is_empty());
    }
}

// ── MapService ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod service {
    use std::thread;

    use bm_core::{BoundingBox, GeoPoint, MapConfig, OsmId};

    use super::helpers::{grid_id, params, service, town};
    use crate::{MapService, RasterRequest, RouteRequest, ServiceError};

    fn corner_to_corner() -> RouteRequest {
        RouteRequest::new(GeoPoint::new(37.8702, -122.2703), GeoPoint::new(37.8498, -122.2496))
    }

    fn along_top_row() -> RouteRequest {
        RouteRequest::new(GeoPoint::new(37.87, -122.27), GeoPoint::new(37.87, -122.25))
    }

    #[test]
    fn service_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MapService>();
    }

    #[test]
    fn invalid_config_rejected() {
        let config = MapConfig { max_depth: 11, ..MapConfig::default() };
        assert!(matches!(MapService::new(config, town()), Err(ServiceError::Tiles(_))));
    }

    #[test]
    fn oversized_tiles_rejected_before_any_raster() {
        let config = MapConfig { tile_size_px: 1 << 31, ..MapConfig::default() };
        assert!(matches!(MapService::new(config, town()), Err(ServiceError::Tiles(_))));
    }

    #[test]
    fn widest_viewport_at_deepest_level() {
        let svc = service();
        let root = svc.config().root;
        let resp = svc.raster(&RasterRequest::new(root, u32::MAX, u32::MAX)).unwrap();
        assert!(resp.query_success);
        assert_eq!(resp.depth, 7);
        assert_eq!(resp.raster_width, 256 << 7);
        assert_eq!(resp.tiles.len(), 1 << 14);
    }

    #[test]
    fn root_query_gives_root_tile() {
        let svc = service();
        let root = svc.config().root;
        let resp = svc.raster(&RasterRequest::new(root, 256, 256)).unwrap();
        assert!(resp.query_success);
        assert_eq!(resp.depth, 0);
        assert_eq!(resp.tiles, vec!["root.png"]);
        assert_eq!((resp.raster_width, resp.raster_height), (256, 256));
        assert_eq!(resp.raster_ul_lon, root.ul_lon);
        assert_eq!(resp.raster_lr_lat, root.lr_lat);
        assert!(resp.route_overlay.is_empty());
    }

    #[test]
    fn query_off_the_map_is_unsuccessful() {
        let svc = service();
        let far = BoundingBox::new(-100.0, 40.0, -99.0, 39.0);
        let resp = svc.raster(&RasterRequest::new(far, 512, 512)).unwrap();
        assert!(!resp.query_success);
        assert!(resp.tiles.is_empty());
    }

    #[test]
    fn degenerate_query_is_client_error() {
        let svc = service();
        let inverted = BoundingBox::new(-122.24, 37.86, -122.26, 37.85);
        let err = svc.raster(&RasterRequest::new(inverted, 512, 512)).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn raster_from_params() {
        let svc = service();
        let p = params(&[
            ("ullon", "-122.2998046875"),
            ("ullat", "37.892195547244356"),
            ("lrlon", "-122.2119140625"),
            ("lrlat", "37.82280243352756"),
            ("w", "512"),
            ("h", "512"),
        ]);
        let resp = svc.raster_params(&p).unwrap();
        assert_eq!(resp.depth, 1);
        assert_eq!(resp.tiles, vec!["1.png", "2.png", "3.png", "4.png"]);
    }

    #[test]
    fn route_becomes_current_and_is_drawn() {
        let svc = service();
        let ids = svc.route(&corner_to_corner());
        assert_eq!(ids.len(), 5);
        assert_eq!(ids.first(), Some(&grid_id(0, 0)));
        assert_eq!(ids.last(), Some(&grid_id(2, 2)));

        let cur = svc.current_route();
        assert_eq!(cur.version, 1);
        assert_eq!(cur.nodes, ids);
        assert_eq!(cur.points.len(), 5);

        let resp = svc.raster(&RasterRequest::new(svc.config().root, 256, 256)).unwrap();
        assert_eq!(resp.route_overlay.len(), 5);
        for [x, y] in resp.route_overlay {
            assert!((0.0..=256.0).contains(&x) && (0.0..=256.0).contains(&y));
        }
    }

    #[test]
    fn straight_route_along_row() {
        let svc = service();
        assert_eq!(svc.route(&along_top_row()), vec![grid_id(0, 0), grid_id(0, 1), grid_id(0, 2)]);
    }

    #[test]
    fn same_nearest_node_gives_single_node() {
        let svc = service();
        let req = RouteRequest::new(GeoPoint::new(37.8601, -122.2601), GeoPoint::new(37.8599, -122.2599));
        assert_eq!(svc.route(&req), vec![grid_id(1, 1)]);
    }

    #[test]
    fn unreachable_route_empties_current_route() {
        let svc = service();
        svc.route(&corner_to_corner());
        let island = RouteRequest::new(GeoPoint::new(37.87, -122.27), GeoPoint::new(37.83, -122.219));
        assert!(svc.route(&island).is_empty());
        let cur = svc.current_route();
        assert!(cur.is_empty());
        assert_eq!(cur.version, 2);
    }

    #[test]
    fn clear_route_empties_overlay() {
        let svc = service();
        svc.route(&corner_to_corner());
        svc.clear_route();
        assert!(svc.current_route().is_empty());
        let resp = svc.raster(&RasterRequest::new(svc.config().root, 256, 256)).unwrap();
        assert!(resp.route_overlay.is_empty());
    }

    #[test]
    fn bad_route_params_leave_current_route_alone() {
        let svc = service();
        svc.route(&along_top_row());
        let p = params(&[("start_lat", "37.87"), ("start_lon", "west"), ("end_lat", "1"), ("end_lon", "2")]);
        assert!(matches!(svc.route_params(&p), Err(ServiceError::InvalidParam { name: "start_lon", .. })));
        assert_eq!(svc.current_route().version, 1);
        assert_eq!(svc.current_route().len(), 3);
    }

    #[test]
    fn route_params_ok() {
        let svc = service();
        let p = params(&[
            ("start_lat", "37.87"),
            ("start_lon", "-122.27"),
            ("end_lat", "37.87"),
            ("end_lon", "-122.25"),
        ]);
        assert_eq!(svc.route_params(&p).unwrap(), vec![OsmId(100), OsmId(101), OsmId(102)]);
    }

    #[test]
    fn concurrent_requests_see_whole_routes() {
        let svc = service();
        let root = svc.config().root;
        thread::scope(|s| {
            for t in 0..4 {
                let svc = &svc;
                s.spawn(move || {
                    for i in 0..25 {
                        let ids = if (t + i) % 2 == 0 {
                            svc.route(&corner_to_corner())
                        } else {
                            svc.route(&along_top_row())
                        };
                        assert!(ids.len() == 5 || ids.len() == 3);
                    }
                });
            }
            for _ in 0..4 {
                let svc = &svc;
                s.spawn(move || {
                    for _ in 0..25 {
                        let snap = svc.current_route();
                        assert_eq!(snap.nodes.len(), snap.points.len());
                        let resp = svc.raster(&RasterRequest::new(root, 256, 256)).unwrap();
                        assert!(matches!(resp.route_overlay.len(), 0 | 3 | 5));
                    }
                });
            }
        });
        assert_eq!(svc.current_route().version, 100);
    }
}
