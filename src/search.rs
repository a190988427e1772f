//! Single-source uniform-cost search (Dijkstra) over a [Graph].
//!
//! All scratch state lives in the [SearchResult] returned by each call, so a graph can be
//! searched repeatedly, or from several threads at once, without any reset step.
use log::{debug, warn};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Result, RouteError};
use crate::graph::{Graph, NodeId};

/// Heap entry. [BinaryHeap] is a max-heap, so the ordering is reversed: the smallest cost
/// compares greatest, and among equal costs the smallest node id does.
#[derive(Clone, Copy, Debug)]
struct SmallestCostHolder {
    cost: OrderedFloat<f64>,
    node: NodeId,
}

impl Eq for SmallestCostHolder {}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.node.cmp(&self.node),
            s => s,
        }
    }
}

/// Per-node distances and predecessors produced by one search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    source: NodeId,
    distance: Vec<f64>,
    predecessor: Vec<Option<NodeId>>,
    settled: Vec<NodeId>,
}

impl SearchResult {
    fn new(source: NodeId, node_count: usize) -> SearchResult {
        SearchResult {
            source,
            distance: vec![f64::INFINITY; node_count],
            predecessor: vec![None; node_count],
            settled: Vec::new(),
        }
    }
    pub fn source(&self) -> NodeId {
        self.source
    }
    /// Distance from the source, `+inf` for unreachable or unknown nodes.
    pub fn distance(&self, node: NodeId) -> f64 {
        self.distance
            .get(node.index())
            .copied()
            .unwrap_or(f64::INFINITY)
    }
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessor.get(node.index()).copied().flatten()
    }
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.distance(node).is_finite()
    }
    /// Nodes in the order they were finalized.
    pub fn settled(&self) -> &[NodeId] {
        &self.settled
    }
    pub fn distances(&self) -> &[f64] {
        &self.distance
    }
    pub fn node_count(&self) -> usize {
        self.distance.len()
    }
}

/// Configurable Dijkstra search. The default runs to exhaustion with no expansion cap.
#[derive(Clone, Debug, Default)]
pub struct DijkstraSearch {
    /// Stop as soon as the target passed to [run](Self::run) is settled. Every node still
    /// queued at that point is at least as far away as the target.
    pub early_exit: bool,
    /// Abort with [RouteError::SearchAborted] instead of settling more than this many nodes.
    pub max_expansions: Option<usize>,
}

impl DijkstraSearch {
    pub fn new() -> DijkstraSearch {
        DijkstraSearch::default()
    }

    pub fn early_exit(mut self, early_exit: bool) -> DijkstraSearch {
        self.early_exit = early_exit;
        self
    }

    pub fn max_expansions(mut self, max_expansions: Option<usize>) -> DijkstraSearch {
        self.max_expansions = max_expansions;
        self
    }

    /// Runs the search from `source`. `target` only matters when [early_exit](Self::early_exit)
    /// is set.
    pub fn run(
        &self,
        graph: &Graph,
        source: NodeId,
        target: Option<NodeId>,
    ) -> Result<SearchResult> {
        if !graph.contains(source) {
            return Err(RouteError::UnknownNode(source));
        }
        let stop_at = if self.early_exit { target } else { None };

        let mut result = SearchResult::new(source, graph.node_count());
        let mut finalized = vec![false; graph.node_count()];
        let mut to_see = BinaryHeap::new();
        result.distance[source.index()] = 0.0;
        to_see.push(SmallestCostHolder {
            cost: OrderedFloat(0.0),
            node: source,
        });

        while let Some(SmallestCostHolder { cost, node }) = to_see.pop() {
            let ix = node.index();
            // A node may sit in the heap several times if a cheaper way to it was found after
            // it was pushed. Only the first pop counts.
            if finalized[ix] || cost.0 > result.distance[ix] {
                continue;
            }
            if let Some(limit) = self.max_expansions {
                if result.settled.len() >= limit {
                    warn!(
                        "Search from {} aborted after settling {} nodes",
                        source, limit
                    );
                    return Err(RouteError::SearchAborted { expanded: limit });
                }
            }
            finalized[ix] = true;
            result.settled.push(node);
            if stop_at == Some(node) {
                debug!("Target {} settled at distance {}, stopping early", node, cost);
                break;
            }

            for &(weight, neighbour) in graph.neighbors(node) {
                let n_ix = neighbour.index();
                if finalized[n_ix] {
                    continue;
                }
                let new_cost = cost.0 + weight;
                if new_cost < result.distance[n_ix] {
                    result.distance[n_ix] = new_cost;
                    result.predecessor[n_ix] = Some(node);
                    to_see.push(SmallestCostHolder {
                        cost: OrderedFloat(new_cost),
                        node: neighbour,
                    });
                }
            }
        }
        debug!(
            "Search from {} settled {} of {} nodes",
            source,
            result.settled.len(),
            graph.node_count()
        );
        Ok(result)
    }
}

/// Full single-source search from `source`. A source outside the graph yields a result in
/// which nothing is reachable.
pub fn shortest_path(graph: &Graph, source: NodeId) -> SearchResult {
    match DijkstraSearch::default().run(graph, source, None) {
        Ok(result) => result,
        Err(e) => {
            warn!("{}", e);
            SearchResult::new(source, graph.node_count())
        }
    }
}
