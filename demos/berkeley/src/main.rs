//! berkeley — command-line front end for the bearmaps engine.
//!
//! Loads an OSM XML extract (or the built-in downtown sample), builds the
//! map service over the Berkeley tile tree, and answers raster and route
//! queries as JSON on stdout.
//!
//! ```text
//! berkeley                                   # sample route + raster
//! berkeley --osm berkeley.osm route 37.8738 -122.2686 37.8677 -122.2709
//! berkeley raster -122.28 37.88 -122.25 37.86 1024 768
//! RUST_LOG=bm_graph=debug berkeley ...
//! ```

mod network;

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bm_core::{BoundingBox, GeoPoint, MapConfig};
use bm_graph::RoadGraph;
use bm_graph::osm::{load_from_xml, load_from_xml_path};
use bm_service::{MapService, RasterRequest, RouteRequest};

use network::DOWNTOWN_OSM;

#[derive(Parser)]
#[command(name = "berkeley")]
#[command(about = "Tile selection and shortest-path routing over a Berkeley road map", long_about = None)]
struct Cli {
    /// OSM XML file to load.  Defaults to a small built-in downtown extract.
    #[arg(long)]
    osm: Option<PathBuf>,

    /// Deepest tile level available.
    #[arg(long, default_value_t = 7)]
    max_depth: u8,

    /// Edge length of a tile image in pixels.
    #[arg(long, default_value_t = 256)]
    tile_size: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Select tiles for a viewport
    Raster {
        #[arg(allow_hyphen_values = true)]
        ullon: f64,
        ullat: f64,
        #[arg(allow_hyphen_values = true)]
        lrlon: f64,
        lrlat: f64,
        w: u32,
        h: u32,
    },
    /// Route between two points, then show it on a raster of the map
    Route {
        start_lat: f64,
        #[arg(allow_hyphen_values = true)]
        start_lon: f64,
        end_lat: f64,
        #[arg(allow_hyphen_values = true)]
        end_lon: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "berkeley=info,bm_graph=info,bm_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = MapConfig {
        max_depth: cli.max_depth,
        tile_size_px: cli.tile_size,
        ..MapConfig::default()
    };
    config.validate().context("invalid map configuration")?;

    let t0 = Instant::now();
    let graph = load_graph(cli.osm.as_ref())?;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        pruned = graph.pruned_count(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "road graph loaded"
    );

    let service = MapService::new(config, graph).context("building map service")?;

    let output = match cli.command {
        Some(Command::Raster { ullon, ullat, lrlon, lrlat, w, h }) => {
            let req = RasterRequest::new(BoundingBox::new(ullon, ullat, lrlon, lrlat), w, h);
            json!({ "raster": service.raster(&req)? })
        }
        Some(Command::Route { start_lat, start_lon, end_lat, end_lon }) => {
            let req = RouteRequest::new(
                GeoPoint::new(start_lat, start_lon),
                GeoPoint::new(end_lat, end_lon),
            );
            route_and_raster(&service, &req)?
        }
        None => {
            // Shattuck & Hearst to Milvia & Bancroft.
            let req = RouteRequest::new(
                GeoPoint::new(37.8738, -122.2686),
                GeoPoint::new(37.8680, -122.2709),
            );
            route_and_raster(&service, &req)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_graph(path: Option<&PathBuf>) -> Result<RoadGraph> {
    match path {
        Some(p) => load_from_xml_path(p).with_context(|| format!("loading {}", p.display())),
        None => load_from_xml(Cursor::new(DOWNTOWN_OSM)).context("loading built-in extract"),
    }
}

/// Route, then rasterise the route's surroundings so the overlay is visible.
fn route_and_raster(service: &MapService, req: &RouteRequest) -> Result<serde_json::Value> {
    let ids = service.route(req);
    let current = service.current_route();

    let names: Vec<Option<&str>> = ids
        .iter()
        .map(|&id| service.graph().lookup(id).and_then(|n| service.graph().name(n)))
        .collect();

    let view = route_viewport(&current.points).unwrap_or(service.config().root);
    let raster = service.raster(&RasterRequest::new(view, 1_024, 768))?;

    Ok(json!({
        "route": ids,
        "names": names,
        "route_version": current.version,
        "raster": raster,
    }))
}

/// Box around the route with a margin, or `None` for routes too short to
/// frame.
fn route_viewport(points: &[GeoPoint]) -> Option<BoundingBox> {
    const MARGIN_DEG: f64 = 0.002;
    if points.len() < 2 {
        return None;
    }
    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);
    let (mut min_lon, mut max_lon) = (f64::MAX, f64::MIN);
    for p in points {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
    }
    Some(BoundingBox::new(
        min_lon - MARGIN_DEG,
        max_lat + MARGIN_DEG,
        max_lon + MARGIN_DEG,
        min_lat - MARGIN_DEG,
    ))
}
