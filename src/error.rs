use grid_util::point::Point;
use thiserror::Error;

use crate::graph::NodeId;

pub type Result<T> = std::result::Result<T, RouteError>;

/// Errors raised while building a graph, searching it or mapping a route back onto the grid.
///
/// An unreachable target is not an error: it shows up as an empty [Route](crate::route::Route).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("malformed grid: {0}")]
    MalformedGrid(#[from] GridDefect),

    #[error("invalid edge {from} -> {to} with weight {weight}")]
    InvalidEdge { from: NodeId, to: NodeId, weight: f64 },

    #[error("node {0} is not part of the graph")]
    UnknownNode(NodeId),

    #[error("search aborted after settling {expanded} nodes")]
    SearchAborted { expanded: usize },

    #[error("internal invariant violated: {0}")]
    InvariantViolation(#[from] Violation),
}

/// What is wrong with a grid handed to the graph builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridDefect {
    #[error("grid has no cells")]
    EmptyGrid,
    #[error("expected {expected} cells for the given dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("rows have differing lengths ({expected} and {actual})")]
    RaggedRows { expected: usize, actual: usize },
    #[error("unknown cell symbol {symbol:?} at {x},{y}")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
    #[error("no start cell")]
    MissingStart,
    #[error("start cell appears at both {0} and {1}")]
    DuplicateStart(Point, Point),
    #[error("no target cell")]
    MissingTarget,
    #[error("target cell appears at both {0} and {1}")]
    DuplicateTarget(Point, Point),
    #[error("start cell {0} has no walkable neighbour")]
    IsolatedStart(Point),
    #[error("target cell {0} has no walkable neighbour")]
    IsolatedTarget(Point),
}

/// Internal consistency failures. Seeing one of these means a bug, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("predecessor chain from {target} does not reach {origin} within {steps} steps")]
    BrokenPredecessorChain {
        origin: NodeId,
        target: NodeId,
        steps: usize,
    },
    #[error("route node {0} has no coordinate")]
    MissingCoordinate(NodeId),
}
