use itertools::Itertools;
use log::error;

use crate::error::{Result, Violation};
use crate::graph::{Graph, NodeId};
use crate::search::SearchResult;

/// Ordered nodes from source to target, both included. An empty route means there is none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    nodes: Vec<NodeId>,
}

impl Route {
    pub fn empty() -> Route {
        Route::default()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
    pub fn source(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
    pub fn target(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
    /// Sum of the edge weights between consecutive nodes. [None] if two consecutive nodes are
    /// not connected in `graph`; an empty or single-node route costs nothing.
    pub fn cost(&self, graph: &Graph) -> Option<f64> {
        self.nodes
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| graph.edge_weight(a, b))
            .sum()
    }
}

impl From<Route> for Vec<NodeId> {
    fn from(route: Route) -> Vec<NodeId> {
        route.nodes
    }
}

/// Walks predecessor links from `target` back to `source`.
///
/// Returns an empty [Route] if `target` was never reached. A chain that stops short of `source`
/// or runs longer than the number of nodes is reported as
/// [Violation::BrokenPredecessorChain].
pub fn reconstruct(result: &SearchResult, source: NodeId, target: NodeId) -> Result<Route> {
    if !result.is_reachable(target) {
        return Ok(Route::empty());
    }
    let limit = result.node_count();
    let mut nodes = vec![target];
    let mut current = target;
    while current != source {
        match result.predecessor(current) {
            Some(parent) if nodes.len() <= limit => {
                nodes.push(parent);
                current = parent;
            }
            _ => {
                let violation = Violation::BrokenPredecessorChain {
                    origin: source,
                    target,
                    steps: nodes.len(),
                };
                error!("{}", violation);
                return Err(violation.into());
            }
        }
    }
    nodes.reverse();
    Ok(Route { nodes })
}
