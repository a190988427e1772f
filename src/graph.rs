use core::fmt;

use log::debug;
use petgraph::unionfind::UnionFind;

use crate::error::{Result, RouteError};

/// Dense identifier of a node. Ids run from 0 to `node_count - 1`, which lets all per-node
/// search state live in plain vectors indexed by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node carries nothing but its identity. Distances and parents belong to a
/// [SearchResult](crate::search::SearchResult).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    pub id: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
}

/// Immutable weighted digraph. Outgoing edges are stored in a compressed adjacency index
/// (one offset per node into a flat neighbour array), built once in [Graph::new] and kept in
/// edge insertion order.
#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    offsets: Vec<usize>,
    adjacency: Vec<(f64, NodeId)>,
}

impl Graph {
    /// Builds a graph with nodes `0..node_count`. Fails with [RouteError::InvalidEdge] if an
    /// edge points outside the graph or has a negative, infinite or NaN weight.
    pub fn new(node_count: usize, edges: Vec<Edge>) -> Result<Graph> {
        for edge in &edges {
            let in_range = edge.from.index() < node_count && edge.to.index() < node_count;
            if !in_range || !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(RouteError::InvalidEdge {
                    from: edge.from,
                    to: edge.to,
                    weight: edge.weight,
                });
            }
        }

        // Counting sort of edges by source node.
        let mut offsets = vec![0; node_count + 1];
        for edge in &edges {
            offsets[edge.from.index() + 1] += 1;
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }
        let mut cursor = offsets.clone();
        let mut adjacency = vec![(0.0, NodeId(0)); edges.len()];
        for edge in &edges {
            let slot = &mut cursor[edge.from.index()];
            adjacency[*slot] = (edge.weight, edge.to);
            *slot += 1;
        }

        debug!("Built graph with {} nodes and {} edges", node_count, edges.len());
        Ok(Graph {
            nodes: (0..node_count).map(|i| Node { id: NodeId(i) }).collect(),
            edges,
            offsets,
            adjacency,
        })
    }

    /// Convenience constructor adding each `(a, b, weight)` in both directions.
    pub fn undirected(node_count: usize, links: &[(usize, usize, f64)]) -> Result<Graph> {
        let edges = links
            .iter()
            .flat_map(|&(a, b, weight)| {
                [
                    Edge {
                        from: NodeId(a),
                        to: NodeId(b),
                        weight,
                    },
                    Edge {
                        from: NodeId(b),
                        to: NodeId(a),
                        weight,
                    },
                ]
            })
            .collect();
        Graph::new(node_count, edges)
    }

    /// Outgoing `(weight, neighbour)` pairs of `node`. Unknown nodes have no neighbours.
    pub fn neighbors(&self, node: NodeId) -> &[(f64, NodeId)] {
        match (self.offsets.get(node.index()), self.offsets.get(node.index() + 1)) {
            (Some(&start), Some(&end)) => &self.adjacency[start..end],
            _ => &[],
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    /// Weight of the cheapest edge from `from` to `to`, if there is one.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.neighbors(from)
            .iter()
            .filter(|(_, n)| *n == to)
            .map(|(w, _)| *w)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Generates a [UnionFind] structure linking the endpoints of every edge, treating edges
    /// as undirected.
    pub fn components(&self) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.node_count());
        for edge in &self.edges {
            components.union(edge.from.index(), edge.to.index());
        }
        components
    }

    /// Checks if `a` and `b` are on the same component. Only meaningful for graphs whose edges
    /// come in pairs, like the ones built from grids.
    pub fn reachable(&self, a: NodeId, b: NodeId) -> bool {
        self.contains(a) && self.contains(b) && self.components().equiv(a.index(), b.index())
    }
}
