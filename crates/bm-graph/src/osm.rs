//! OSM loaders.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use bm_graph::osm::load_from_xml_path;
//!
//! let graph = load_from_xml_path(Path::new("berkeley.osm"))?;
//! ```
//!
//! # What is loaded
//!
//! - Every `node` becomes a candidate intersection.  A missing or malformed
//!   `id`/`lat`/`lon` aborts the load.
//! - A node's `name` tag becomes its display name.
//! - Ways whose `highway` class is in [`TRAVERSABLE_HIGHWAYS`] connect their
//!   consecutive node references.  Every other way is ignored.  An
//!   unreadable `nd` reference splits its way in two.
//!
//! Isolated nodes (buildings, POIs, footway-only vertices) are pruned by
//! [`RoadGraphBuilder::build`].
//!
//! The format readers are feature-gated: `osm-xml` (quick-xml) and `osm-pbf`
//! (osmpbf).  The highway filter is always available.

use crate::RoadGraphBuilder;

use bm_core::OsmId;

/// Highway classes treated as traversable.
///
/// Service roads, footways and other pedestrian classes are left out so
/// routes stay on the street grid.
pub const TRAVERSABLE_HIGHWAYS: &[&str] = &[
    "motorway",
    "trunk",
    "primary",
    "secondary",
    "tertiary",
    "unclassified",
    "residential",
    "living_street",
    "motorway_link",
    "trunk_link",
    "primary_link",
    "secondary_link",
    "tertiary_link",
];

/// `true` if a way with this `highway` value should contribute edges.
pub fn is_traversable(highway: &str) -> bool {
    TRAVERSABLE_HIGHWAYS.contains(&highway)
}

// ── Internal types ────────────────────────────────────────────────────────────

/// A way being accumulated by a reader.
///
/// Node references are kept as runs of consecutive, readable references.  An
/// unreadable reference ends the current run, so its neighbours are never
/// joined to each other.
#[derive(Default)]
#[cfg_attr(not(any(feature = "osm-xml", feature = "osm-pbf")), allow(dead_code))]
struct OsmWay {
    runs: Vec<Vec<OsmId>>,
    highway: Option<String>,
}

#[cfg_attr(not(any(feature = "osm-xml", feature = "osm-pbf")), allow(dead_code))]
impl OsmWay {
    #[cfg(feature = "osm-pbf")]
    fn from_refs(refs: Vec<OsmId>, highway: Option<String>) -> Self {
        OsmWay { runs: vec![refs], highway }
    }

    #[cfg(feature = "osm-xml")]
    fn push_ref(&mut self, id: OsmId) {
        match self.runs.last_mut() {
            Some(run) => run.push(id),
            None => self.runs.push(vec![id]),
        }
    }

    /// Close the current run at an unreadable reference.
    #[cfg(feature = "osm-xml")]
    fn break_run(&mut self) {
        if self.runs.last().is_some_and(|run| !run.is_empty()) {
            self.runs.push(Vec::new());
        }
    }

    fn flush_into(&mut self, builder: &mut RoadGraphBuilder) {
        let traversable = self.highway.as_deref().is_some_and(is_traversable);
        for run in self.runs.drain(..) {
            builder.add_way(&run, traversable);
        }
        self.highway = None;
    }
}

// ── XML ───────────────────────────────────────────────────────────────────────

#[cfg(feature = "osm-xml")]
pub use xml::{load_from_xml, load_from_xml_path};

#[cfg(feature = "osm-xml")]
mod xml {
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::path::Path;

    use quick_xml::Reader;
    use quick_xml::events::{BytesStart, Event};
    use tracing::{info, warn};

    use bm_core::{GeoPoint, OsmId};

    use super::OsmWay;
    use crate::{GraphError, GraphResult, RoadGraph, RoadGraphBuilder};

    /// Where the reader currently is in the element tree.
    enum Context {
        Top,
        Node(OsmId),
        Way(OsmWay),
    }

    /// Load a road graph from an OSM XML file.
    ///
    /// # Errors
    ///
    /// [`GraphError::Io`] if the file cannot be opened, otherwise as
    /// [`load_from_xml`].
    pub fn load_from_xml_path(path: &Path) -> GraphResult<RoadGraph> {
        info!(path = %path.display(), "loading OSM XML");
        let file = File::open(path)?;
        load_from_xml(BufReader::new(file))
    }

    /// Load a road graph from any buffered OSM XML source.
    ///
    /// # Errors
    ///
    /// [`GraphError::Osm`] on XML syntax errors, [`GraphError::MalformedNode`]
    /// for a node without a parseable `id`/`lat`/`lon`, and the builder's
    /// coordinate and duplicate checks.
    pub fn load_from_xml<R: BufRead>(source: R) -> GraphResult<RoadGraph> {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);

        let mut builder = RoadGraphBuilder::new();
        let mut ctx = Context::Top;
        let mut bad_refs = 0usize;
        let mut ways = 0usize;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| GraphError::Osm(e.to_string()))?;
            match event {
                Event::Start(ref e) => {
                    ctx = on_element(e, ctx, &mut builder, &mut bad_refs)?;
                }
                Event::Empty(ref e) => {
                    ctx = on_element(e, ctx, &mut builder, &mut bad_refs)?;
                    // A self-closing node or way has no children.
                    ctx = close(e.name().as_ref(), ctx, &mut builder, &mut ways);
                }
                Event::End(ref e) => {
                    ctx = close(e.name().as_ref(), ctx, &mut builder, &mut ways);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if bad_refs > 0 {
            warn!(bad_refs, "unparseable way node references dropped; ways split at each");
        }
        info!(
            nodes = builder.node_count(),
            ways,
            segments = builder.edge_count(),
            "OSM XML parsed"
        );
        Ok(builder.build())
    }

    fn on_element(
        e: &BytesStart<'_>,
        ctx: Context,
        builder: &mut RoadGraphBuilder,
        bad_refs: &mut usize,
    ) -> GraphResult<Context> {
        match (e.name().as_ref(), ctx) {
            (b"node", _) => {
                let id = required(e, b"id")?;
                let id: OsmId = id
                    .parse()
                    .map_err(|err| GraphError::MalformedNode(format!("{err}")))?;
                let lat = coordinate(e, b"lat", id)?;
                let lon = coordinate(e, b"lon", id)?;
                builder.add_node(id, GeoPoint::new(lat, lon))?;
                Ok(Context::Node(id))
            }
            (b"way", _) => Ok(Context::Way(OsmWay::default())),
            (b"nd", Context::Way(mut way)) => {
                match attr(e, b"ref")?.and_then(|r| r.parse::<OsmId>().ok()) {
                    Some(id) => way.push_ref(id),
                    None => {
                        way.break_run();
                        *bad_refs += 1;
                    }
                }
                Ok(Context::Way(way))
            }
            (b"tag", Context::Way(mut way)) => {
                if attr(e, b"k")?.as_deref() == Some("highway") {
                    way.highway = attr(e, b"v")?;
                }
                Ok(Context::Way(way))
            }
            (b"tag", Context::Node(id)) => {
                if attr(e, b"k")?.as_deref() == Some("name") {
                    if let Some(name) = attr(e, b"v")? {
                        builder.set_name(id, name);
                    }
                }
                Ok(Context::Node(id))
            }
            (_, ctx) => Ok(ctx),
        }
    }

    fn close(
        name: &[u8],
        ctx: Context,
        builder: &mut RoadGraphBuilder,
        ways: &mut usize,
    ) -> Context {
        match (name, ctx) {
            (b"way", Context::Way(mut way)) => {
                way.flush_into(builder);
                *ways += 1;
                Context::Top
            }
            (b"node", Context::Node(_)) => Context::Top,
            (_, ctx) => ctx,
        }
    }

    fn attr(e: &BytesStart<'_>, key: &[u8]) -> GraphResult<Option<String>> {
        for a in e.attributes() {
            let a = a.map_err(|err| GraphError::Osm(err.to_string()))?;
            if a.key.as_ref() == key {
                let value = a
                    .unescape_value()
                    .map_err(|err| GraphError::Osm(err.to_string()))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn required(e: &BytesStart<'_>, key: &[u8]) -> GraphResult<String> {
        attr(e, key)?.ok_or_else(|| {
            GraphError::MalformedNode(format!(
                "missing attribute `{}`",
                String::from_utf8_lossy(key)
            ))
        })
    }

    fn coordinate(e: &BytesStart<'_>, key: &[u8], id: OsmId) -> GraphResult<f64> {
        let raw = attr(e, key)?.ok_or_else(|| {
            GraphError::MalformedNode(format!(
                "node {id} missing `{}`",
                String::from_utf8_lossy(key)
            ))
        })?;
        raw.trim().parse::<f64>().map_err(|_| {
            GraphError::MalformedNode(format!(
                "node {id} has non-numeric `{}`: {raw:?}",
                String::from_utf8_lossy(key)
            ))
        })
    }
}

// ── PBF ───────────────────────────────────────────────────────────────────────

#[cfg(feature = "osm-pbf")]
pub use pbf::load_from_pbf;

#[cfg(feature = "osm-pbf")]
mod pbf {
    use std::path::Path;

    use osmpbf::{Element, ElementReader};
    use tracing::info;

    use bm_core::{GeoPoint, OsmId};

    use super::OsmWay;
    use crate::{GraphError, GraphResult, RoadGraph, RoadGraphBuilder};

    struct RawNode {
        id: i64,
        lat: f64,
        lon: f64,
        name: Option<String>,
    }

    /// Load a road graph from an OSM PBF file.
    ///
    /// The reader callback cannot return errors, so nodes and ways are
    /// collected in one pass and fed to the builder afterwards.
    ///
    /// # Errors
    ///
    /// [`GraphError::Osm`] on parse errors, plus the builder's coordinate and
    /// duplicate checks.
    pub fn load_from_pbf(path: &Path) -> GraphResult<RoadGraph> {
        info!(path = %path.display(), "loading OSM PBF");
        let reader =
            ElementReader::from_path(path).map_err(|e| GraphError::Osm(e.to_string()))?;

        let mut nodes: Vec<RawNode> = Vec::new();
        let mut ways: Vec<OsmWay> = Vec::new();

        reader
            .for_each(|elem| match elem {
                Element::Node(n) => nodes.push(RawNode {
                    id: n.id(),
                    lat: n.lat(),
                    lon: n.lon(),
                    name: n.tags().find(|(k, _)| *k == "name").map(|(_, v)| v.to_owned()),
                }),
                Element::DenseNode(n) => nodes.push(RawNode {
                    id: n.id(),
                    lat: n.lat(),
                    lon: n.lon(),
                    name: n.tags().find(|(k, _)| *k == "name").map(|(_, v)| v.to_owned()),
                }),
                Element::Way(w) => {
                    let highway = w.tags().find(|(k, _)| *k == "highway").map(|(_, v)| v.to_owned());
                    if highway.is_some() {
                        ways.push(OsmWay::from_refs(w.refs().map(OsmId).collect(), highway));
                    }
                }
                _ => {}
            })
            .map_err(|e| GraphError::Osm(e.to_string()))?;

        let mut builder = RoadGraphBuilder::with_capacity(nodes.len(), nodes.len() * 2);
        for raw in nodes {
            let id = OsmId(raw.id);
            builder.add_node(id, GeoPoint::new(raw.lat, raw.lon))?;
            if let Some(name) = raw.name {
                builder.set_name(id, name);
            }
        }
        let way_count = ways.len();
        for mut way in ways {
            way.flush_into(&mut builder);
        }

        info!(
            nodes = builder.node_count(),
            ways = way_count,
            segments = builder.edge_count(),
            "OSM PBF parsed"
        );
        Ok(builder.build())
    }
}
