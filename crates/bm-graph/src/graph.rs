//! Road graph representation and builder.
//!
//! # Data layout
//!
//! Surviving intersections are renumbered into dense [`NodeId`]s in
//! ascending [`OsmId`] order, so iterating `0..node_count` visits nodes in
//! identifier order.  Adjacency is stored in **Compressed Sparse Row (CSR)**
//! form: the neighbours of node `n` occupy
//!
//! ```text
//! adj[ adj_start[n] .. adj_start[n+1] ]
//! ```
//!
//! Every undirected edge A↔B appears twice, once in each endpoint's slice.
//! Each slice is sorted by `NodeId` and holds no duplicates.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over `[lat, lon]` answers nearest-node queries
//! for route endpoints.  Distance is plain Euclidean in degree space, the
//! same metric the router uses.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use bm_core::{GeoPoint, NodeId, OsmId};

use crate::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Borrowed view of one intersection.
#[derive(Copy, Clone, Debug)]
pub struct NodeRef<'a> {
    pub id: NodeId,
    pub osm_id: OsmId,
    pub pos: GeoPoint,
    pub name: Option<&'a str>,
}

/// Undirected, pruned road graph in CSR form plus a nearest-node index.
///
/// Immutable once built; share it behind an `Arc` for concurrent queries.
/// Do not construct directly; use [`RoadGraphBuilder`].
pub struct RoadGraph {
    // ── Node data (indexed by NodeId) ─────────────────────────────────────
    /// Source identifier of each node.  Strictly ascending.
    node_osm_id: Vec<OsmId>,

    /// Geographic position of each node.
    node_pos: Vec<GeoPoint>,

    node_name: Vec<Option<Box<str>>>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    adj_start: Vec<u32>,

    /// Concatenated neighbour lists.
    adj: Vec<NodeId>,

    // ── Lookup ────────────────────────────────────────────────────────────
    index: FxHashMap<OsmId, NodeId>,
    spatial_idx: RTree<NodeEntry>,

    pruned: usize,
}

impl RoadGraph {
    /// Construct an empty graph.  Every route query against it is empty.
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adj.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Number of nodes removed at build time for having no adjacent nodes.
    pub fn pruned_count(&self) -> usize {
        self.pruned
    }

    // ── Node lookup ───────────────────────────────────────────────────────

    /// Resolve a source identifier.  `None` if the node never existed or
    /// was pruned.
    #[inline]
    pub fn lookup(&self, id: OsmId) -> Option<NodeId> {
        self.index.get(&id).copied()
    }

    #[inline]
    pub fn contains(&self, id: OsmId) -> bool {
        self.index.contains_key(&id)
    }

    #[inline]
    pub fn pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    #[inline]
    pub fn osm_id(&self, node: NodeId) -> OsmId {
        self.node_osm_id[node.index()]
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.node_name[node.index()].as_deref()
    }

    pub fn node(&self, node: NodeId) -> NodeRef<'_> {
        NodeRef {
            id: node,
            osm_id: self.osm_id(node),
            pos: self.pos(node),
            name: self.name(node),
        }
    }

    /// All nodes in ascending identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.node_count()).map(|i| self.node(NodeId(i as u32)))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Adjacent nodes of `node`, sorted by `NodeId`.  Never empty for a
    /// node of a built graph.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        let start = self.adj_start[node.index()] as usize;
        let end = self.adj_start[node.index() + 1] as usize;
        &self.adj[start..end]
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the node nearest to `pos` by Euclidean distance in degree
    /// space.  Among equidistant nodes the lowest identifier wins, which is
    /// what a linear scan in ascending identifier order would pick.
    ///
    /// Returns `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        let mut iter = self
            .spatial_idx
            .nearest_neighbor_iter_with_distance_2(&[pos.lat, pos.lon]);
        let (first, best) = iter.next()?;
        let tied = iter.take_while(|&(_, d2)| d2 <= best).map(|(e, _)| e.id);
        Some(tied.fold(first.id, NodeId::min))
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes and ways may arrive in any order.  Way references are resolved at
/// build time, so a way may name a node that is added after it.
///
/// # Example
///
/// ```
/// use bm_core::{GeoPoint, OsmId};
/// use bm_graph::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// b.add_node(OsmId(1), GeoPoint::new(37.87, -122.26)).unwrap();
/// b.add_node(OsmId(2), GeoPoint::new(37.88, -122.26)).unwrap();
/// b.add_node(OsmId(3), GeoPoint::new(37.89, -122.26)).unwrap(); // isolated
/// b.add_way(&[OsmId(1), OsmId(2)], true);
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.pruned_count(), 1);
/// ```
pub struct RoadGraphBuilder {
    nodes: FxHashMap<OsmId, PendingNode>,
    raw_edges: Vec<(OsmId, OsmId)>,
}

struct PendingNode {
    pos: GeoPoint,
    name: Option<String>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self { nodes: FxHashMap::default(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and consecutive-pair
    /// edges when bulk-loading an OSM extract.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        let mut map = FxHashMap::default();
        map.reserve(nodes);
        Self { nodes: map, raw_edges: Vec::with_capacity(edges) }
    }

    /// Add an intersection.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidCoordinate`] for non-finite or out-of-range
    /// coordinates, [`GraphError::DuplicateNode`] if `id` was already added.
    pub fn add_node(&mut self, id: OsmId, pos: GeoPoint) -> GraphResult<()> {
        if !pos.is_valid() {
            return Err(GraphError::InvalidCoordinate { id, lat: pos.lat, lon: pos.lon });
        }
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.nodes.insert(id, PendingNode { pos, name: None });
        Ok(())
    }

    /// Attach a display name to a node added earlier.  Returns `false` if
    /// the node is unknown.
    pub fn set_name(&mut self, id: OsmId, name: impl Into<String>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.name = Some(name.into());
                true
            }
            None => false,
        }
    }

    /// Record a road segment.
    ///
    /// Only traversable ways contribute edges, and only between
    /// *consecutive* references: `[a, b, c]` yields `a↔b` and `b↔c`, never
    /// `a↔c`.  Repeated consecutive references are skipped.
    pub fn add_way(&mut self, refs: &[OsmId], traversable: bool) {
        if !traversable {
            return;
        }
        for pair in refs.windows(2) {
            if pair[0] != pair[1] {
                self.raw_edges.push((pair[0], pair[1]));
            }
        }
    }

    pub fn contains_node(&self, id: OsmId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// 1. Resolve recorded pairs.  A pair naming an unknown node is dropped.
    /// 2. Prune every node whose adjacency is empty.
    /// 3. Renumber survivors in ascending identifier order, build CSR
    ///    adjacency and bulk-load the R-tree.
    pub fn build(self) -> RoadGraph {
        let RoadGraphBuilder { mut nodes, raw_edges } = self;
        let total_nodes = nodes.len();

        // ── Resolve adjacency over source ids ─────────────────────────────
        let mut adjacency: FxHashMap<OsmId, Vec<OsmId>> = FxHashMap::default();
        let mut dropped = 0usize;
        for (a, b) in raw_edges {
            if nodes.contains_key(&a) && nodes.contains_key(&b) {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(dropped, "road segments referenced unknown nodes; pairs dropped");
        }

        // ── Prune isolated nodes ──────────────────────────────────────────
        let mut survivors: Vec<OsmId> = adjacency.keys().copied().collect();
        survivors.sort_unstable();
        let pruned = total_nodes - survivors.len();

        let index: FxHashMap<OsmId, NodeId> = survivors
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, NodeId(i as u32)))
            .collect();

        // ── Node arrays + CSR ─────────────────────────────────────────────
        let n = survivors.len();
        let mut node_pos = Vec::with_capacity(n);
        let mut node_name = Vec::with_capacity(n);
        let mut adj_start = Vec::with_capacity(n + 1);
        let mut adj = Vec::new();
        adj_start.push(0u32);

        for id in &survivors {
            // Every survivor has an adjacency entry, and every adjacency key
            // came from `nodes`.
            if let Some(node) = nodes.remove(id) {
                node_pos.push(node.pos);
                node_name.push(node.name.map(String::into_boxed_str));
            }
            let mut row: Vec<NodeId> = adjacency
                .get(id)
                .map(|ns| ns.iter().filter_map(|other| index.get(other).copied()).collect())
                .unwrap_or_default();
            row.sort_unstable();
            row.dedup();
            adj.extend_from_slice(&row);
            adj_start.push(adj.len() as u32);
        }
        debug_assert_eq!(node_pos.len(), n);

        let entries: Vec<NodeEntry> = node_pos
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry { point: [pos.lat, pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        info!(
            nodes = n,
            edges = adj.len() / 2,
            pruned,
            "road graph built"
        );

        RoadGraph {
            node_osm_id: survivors,
            node_pos,
            node_name,
            adj_start,
            adj,
            index,
            spatial_idx,
            pruned,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
