//! Routing trait and the default A* implementation.
//!
//! # Pluggability
//!
//! `bm-service` routes through the [`Router`] trait, so an application can
//! swap in another search without touching the service layer.  The default
//! [`AStarRouter`] is what the map server ships with.
//!
//! # Cost units
//!
//! Costs are Euclidean distances in degree space (`f64`).  The heuristic is
//! the straight-line distance to the goal under the same metric, so it is
//! admissible and consistent and a settled node never needs reopening.
//!
//! # Search state
//!
//! Every call allocates its own `FxHashMap<NodeId, SearchState>` holding
//! only the nodes it touches.  Nothing is written to the graph, so any
//! number of queries may run against one `&RoadGraph` concurrently.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;
use tracing::trace;

use bm_core::{GeoPoint, NodeId, OsmId};

use crate::graph::RoadGraph;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: the visited nodes in order and the total
/// Euclidean cost.
///
/// An empty route means no path: the graph was empty or the goal lies in a
/// different component from the start.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Nodes from start to goal, both inclusive.
    pub nodes: Vec<NodeId>,
    /// Sum of edge costs along `nodes`, in degrees.
    pub total_cost: f64,
}

impl Route {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if the start and goal snapped to the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Map the route to source identifiers.
    pub fn osm_ids(&self, graph: &RoadGraph) -> Vec<OsmId> {
        self.nodes.iter().map(|&n| graph.osm_id(n)).collect()
    }

    /// Coordinates along the route, for overlay drawing.
    pub fn points(&self, graph: &RoadGraph) -> Vec<GeoPoint> {
        self.nodes.iter().map(|&n| graph.pos(n)).collect()
    }

    /// Great-circle length in metres.
    pub fn length_m(&self, graph: &RoadGraph) -> f64 {
        self.nodes
            .windows(2)
            .map(|w| graph.pos(w[0]).distance_m(graph.pos(w[1])))
            .sum()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a single router can serve
/// concurrent requests.
pub trait Router: Send + Sync {
    /// Shortest path between two graph nodes.
    ///
    /// `from == to` yields a single-node route.  An unreachable `to` yields
    /// an empty route.
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> Route;

    /// Snap both endpoints to their nearest nodes, then route between them.
    fn find_path(&self, graph: &RoadGraph, start: GeoPoint, end: GeoPoint) -> Route {
        match (graph.snap_to_node(start), graph.snap_to_node(end)) {
            (Some(from), Some(to)) => self.route(graph, from, to),
            _ => Route::empty(),
        }
    }
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// A* over the undirected road graph with Euclidean edge costs.
///
/// Decrease-key is handled by pushing a fresh heap entry for the improved
/// node and skipping outdated entries when they surface.  Once a node is
/// settled its cost is final and later entries for it are ignored.
#[derive(Copy, Clone, Debug, Default)]
pub struct AStarRouter;

impl Router for AStarRouter {
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> Route {
        astar(graph, from, to)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Per-query bookkeeping for one touched node.
#[derive(Copy, Clone, Debug)]
struct SearchState {
    /// Best known cost from the start.
    g: f64,
    /// Straight-line estimate to the goal.  Fixed per node.
    h: f64,
    /// Predecessor on the best known path; `NodeId::INVALID` for the start.
    prev: NodeId,
    settled: bool,
}

impl SearchState {
    #[inline]
    fn priority(&self) -> f64 {
        self.g + self.h
    }
}

/// Total order over non-NaN costs so they can key a `BinaryHeap`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn astar(graph: &RoadGraph, from: NodeId, to: NodeId) -> Route {
    if from == to {
        return Route { nodes: vec![from], total_cost: 0.0 };
    }

    let goal = graph.pos(to);
    let mut states: FxHashMap<NodeId, SearchState> = FxHashMap::default();

    let start = SearchState {
        g: 0.0,
        h: graph.pos(from).euclidean_deg(goal),
        prev: NodeId::INVALID,
        settled: false,
    };
    states.insert(from, start);

    // Min-heap: (priority, node).  Secondary key NodeId makes tie-breaking
    // deterministic.
    let mut open: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    open.push(Reverse((Cost(start.priority()), from)));

    let mut settled = 0usize;

    while let Some(Reverse((Cost(priority), node))) = open.pop() {
        let Some(state) = states.get_mut(&node) else { continue };

        // Skip stale heap entries.
        if state.settled || priority > state.priority() {
            continue;
        }
        state.settled = true;
        settled += 1;

        if node == to {
            trace!(settled, "a* reached goal");
            return reconstruct(&states, to);
        }

        let g = state.g;
        let here = graph.pos(node);

        for &next in graph.neighbors(node) {
            let candidate = g + here.euclidean_deg(graph.pos(next));
            match states.entry(next) {
                Entry::Occupied(mut e) => {
                    let s = e.get_mut();
                    if s.settled || candidate >= s.g {
                        continue;
                    }
                    s.g = candidate;
                    s.prev = node;
                    open.push(Reverse((Cost(s.priority()), next)));
                }
                Entry::Vacant(e) => {
                    let s = e.insert(SearchState {
                        g: candidate,
                        h: graph.pos(next).euclidean_deg(goal),
                        prev: node,
                        settled: false,
                    });
                    open.push(Reverse((Cost(s.priority()), next)));
                }
            }
        }
    }

    trace!(settled, "a* exhausted open set without reaching goal");
    Route::empty()
}

fn reconstruct(states: &FxHashMap<NodeId, SearchState>, to: NodeId) -> Route {
    let total_cost = states.get(&to).map_or(0.0, |s| s.g);
    let mut nodes = Vec::new();
    let mut cur = to;
    while cur != NodeId::INVALID {
        nodes.push(cur);
        cur = states.get(&cur).map_or(NodeId::INVALID, |s| s.prev);
    }
    nodes.reverse();
    Route { nodes, total_cost }
}

// ── Batch routing ─────────────────────────────────────────────────────────────

/// Answer many independent `(start, end)` queries in parallel.
///
/// Results are returned in query order.  Each query runs its own search, so
/// the output is identical to calling [`Router::find_path`] sequentially.
#[cfg(feature = "parallel")]
pub fn find_paths_par<R: Router>(
    router: &R,
    graph: &RoadGraph,
    queries: &[(GeoPoint, GeoPoint)],
) -> Vec<Route> {
    use rayon::prelude::*;

    queries
        .par_iter()
        .map(|&(start, end)| router.find_path(graph, start, end))
        .collect()
}
