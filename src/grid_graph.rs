use core::fmt;
use std::str::FromStr;

use fxhash::FxBuildHasher;
use grid_util::point::Point;
use indexmap::IndexSet;
use itertools::iproduct;
use log::{debug, info};
use smallvec::SmallVec;

use crate::error::{GridDefect, Result, RouteError};
use crate::graph::{Edge, Graph, NodeId};
use crate::{DIAGONAL_COST, ORTHOGONAL_COST};

type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

/// Classification of a single grid cell. Start and target cells are walkable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    Wall,
    #[default]
    Walkable,
    Start,
    Target,
}

impl Cell {
    pub fn is_walkable(self) -> bool {
        self != Cell::Wall
    }
    fn symbol(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Walkable => '.',
            Cell::Start => 'S',
            Cell::Target => 'G',
        }
    }
}

/// Rectangular grid of [Cell]s stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new(width: usize, height: usize, default_value: Cell) -> CellGrid {
        CellGrid {
            width,
            height,
            cells: vec![default_value; width * height],
        }
    }
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<CellGrid> {
        if cells.len() != width * height {
            return Err(GridDefect::DimensionMismatch {
                expected: width * height,
                actual: cells.len(),
            }
            .into());
        }
        Ok(CellGrid {
            width,
            height,
            cells,
        })
    }
    /// Fills the grid row by row from `f(x, y)`.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> CellGrid
    where
        F: FnMut(usize, usize) -> Cell,
    {
        let cells = iproduct!(0..height, 0..width)
            .map(|(y, x)| f(x, y))
            .collect();
        CellGrid {
            width,
            height,
            cells,
        }
    }
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if self.in_bounds(x, y) {
            Some(self.cells[y as usize * self.width + x as usize])
        } else {
            None
        }
    }
    pub fn get_point(&self, p: Point) -> Option<Cell> {
        self.get(p.x, p.y)
    }
    /// Sets a cell, ignoring positions outside the grid.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if self.in_bounds(x, y) {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }
    pub fn set_point(&mut self, p: Point, cell: Cell) {
        self.set(p.x, p.y, cell)
    }
    pub fn can_move_to(&self, p: Point) -> bool {
        self.get_point(p).is_some_and(Cell::is_walkable)
    }
    /// All positions holding `cell`, in row-major order.
    pub fn positions(&self, cell: Cell) -> impl Iterator<Item = Point> + '_ {
        iproduct!(0..self.height, 0..self.width)
            .filter(move |&(y, x)| self.cells[y * self.width + x] == cell)
            .map(|(y, x)| Point::new(x as i32, y as i32))
    }
}

impl fmt::Display for CellGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.width.max(1)) {
            let line: String = row.iter().map(|c| c.symbol()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Parses the text form written by [Display](fmt::Display): `#` wall, `.` walkable, `S` start,
/// `G` target, one row per line. Blank lines and surrounding whitespace are ignored.
impl FromStr for CellGrid {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<CellGrid> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(GridDefect::RaggedRows {
                    expected: width,
                    actual: len,
                }
                .into());
            }
            for (x, symbol) in row.chars().enumerate() {
                cells.push(match symbol {
                    '#' => Cell::Wall,
                    '.' => Cell::Walkable,
                    'S' => Cell::Start,
                    'G' => Cell::Target,
                    _ => return Err(GridDefect::UnknownSymbol { symbol, x, y }.into()),
                });
            }
        }
        CellGrid::from_cells(width, rows.len(), cells)
    }
}

/// Offsets visited around each cell, in the order edges are emitted.
const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Turns a [CellGrid] into a [GridGraph].
#[derive(Clone, Debug)]
pub struct GridGraphBuilder {
    /// Use the 8-neighbourhood (diagonal steps cost [DIAGONAL_COST]) instead of the
    /// 4-neighbourhood.
    pub allow_diagonal: bool,
}

impl Default for GridGraphBuilder {
    fn default() -> GridGraphBuilder {
        GridGraphBuilder {
            allow_diagonal: true,
        }
    }
}

impl GridGraphBuilder {
    pub fn new() -> GridGraphBuilder {
        GridGraphBuilder::default()
    }

    pub fn allow_diagonal(mut self, allow_diagonal: bool) -> GridGraphBuilder {
        self.allow_diagonal = allow_diagonal;
        self
    }

    fn neighbourhood(&self) -> SmallVec<[(i32, i32, f64); 8]> {
        MOORE_OFFSETS
            .iter()
            .filter(|(dx, dy)| self.allow_diagonal || dx * dy == 0)
            .map(|&(dx, dy)| {
                let cost = if dx != 0 && dy != 0 {
                    DIAGONAL_COST
                } else {
                    ORTHOGONAL_COST
                };
                (dx, dy, cost)
            })
            .collect()
    }

    /// Creates one node per walkable cell, numbered in row-major order, and an edge for every
    /// ordered pair of adjacent walkable cells.
    pub fn build(&self, grid: &CellGrid) -> Result<GridGraph> {
        if grid.width() == 0 || grid.height() == 0 {
            return Err(GridDefect::EmptyGrid.into());
        }
        let start = single_position(grid, Cell::Start).map_err(|dup| {
            dup.map_or(GridDefect::MissingStart, |(a, b)| {
                GridDefect::DuplicateStart(a, b)
            })
        })?;
        let target = single_position(grid, Cell::Target).map_err(|dup| {
            dup.map_or(GridDefect::MissingTarget, |(a, b)| {
                GridDefect::DuplicateTarget(a, b)
            })
        })?;

        let coordinates: FxIndexSet<Point> =
            iproduct!(0..grid.height() as i32, 0..grid.width() as i32)
                .map(|(y, x)| Point::new(x, y))
                .filter(|p| grid.can_move_to(*p))
                .collect();

        let neighbourhood = self.neighbourhood();
        let mut edges = Vec::with_capacity(coordinates.len() * neighbourhood.len());
        for (ix, p) in coordinates.iter().enumerate() {
            for &(dx, dy, weight) in &neighbourhood {
                if let Some(to) = coordinates.get_index_of(&Point::new(p.x + dx, p.y + dy)) {
                    edges.push(Edge {
                        from: NodeId(ix),
                        to: NodeId(to),
                        weight,
                    });
                }
            }
        }

        let graph = Graph::new(coordinates.len(), edges)?;
        let node_at = |p: &Point| coordinates.get_index_of(p).map(NodeId);
        let start_id = node_at(&start).ok_or(GridDefect::MissingStart)?;
        let target_id = node_at(&target).ok_or(GridDefect::MissingTarget)?;
        // A lone start or target next to nothing can never be part of a route, unless the two
        // coincide, which cells cannot express.
        if graph.neighbors(start_id).is_empty() {
            return Err(GridDefect::IsolatedStart(start).into());
        }
        if graph.neighbors(target_id).is_empty() {
            return Err(GridDefect::IsolatedTarget(target).into());
        }
        info!(
            "Built {}x{} grid graph: {} nodes, {} edges, start {} target {}",
            grid.width(),
            grid.height(),
            graph.node_count(),
            graph.edge_count(),
            start,
            target
        );
        Ok(GridGraph {
            graph,
            start: start_id,
            target: target_id,
            coordinates: CoordinateMap { points: coordinates },
            width: grid.width(),
            height: grid.height(),
        })
    }
}

/// `Ok(p)` for exactly one occurrence, `Err(None)` for none and `Err(Some(first, second))` for
/// duplicates.
fn single_position(
    grid: &CellGrid,
    cell: Cell,
) -> std::result::Result<Point, Option<(Point, Point)>> {
    let mut found = grid.positions(cell);
    match (found.next(), found.next()) {
        (Some(p), None) => Ok(p),
        (Some(a), Some(b)) => Err(Some((a, b))),
        (None, _) => Err(None),
    }
}

/// Bijection between node ids and grid positions. The index of a point in the set is its id.
#[derive(Clone, Debug, Default)]
pub struct CoordinateMap {
    points: FxIndexSet<Point>,
}

impl CoordinateMap {
    pub fn coordinate(&self, node: NodeId) -> Option<Point> {
        self.points.get_index(node.index()).copied()
    }
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.points.get_index_of(&point).map(NodeId)
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.points.iter().enumerate().map(|(i, p)| (NodeId(i), *p))
    }
}

/// Output of [GridGraphBuilder::build]: the graph plus everything needed to map results back
/// onto the grid.
#[derive(Clone, Debug)]
pub struct GridGraph {
    pub graph: Graph,
    pub start: NodeId,
    pub target: NodeId,
    pub coordinates: CoordinateMap,
    pub width: usize,
    pub height: usize,
}

impl GridGraph {
    /// Builds with the default 8-neighbourhood.
    pub fn from_cells(grid: &CellGrid) -> Result<GridGraph> {
        GridGraphBuilder::default().build(grid)
    }
    pub fn start_point(&self) -> Option<Point> {
        self.coordinates.coordinate(self.start)
    }
    pub fn target_point(&self) -> Option<Point> {
        self.coordinates.coordinate(self.target)
    }
    /// Checks if start and target are on the same component.
    pub fn reachable(&self) -> bool {
        let reachable = self.graph.reachable(self.start, self.target);
        if !reachable {
            debug!("{} and {} are not equivalent components", self.start, self.target);
        }
        reachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::SQRT_2;

    fn parse(s: &str) -> CellGrid {
        s.parse().unwrap()
    }

    #[test]
    fn text_form_round_trips() {
        let text = "S.#\n.#.\n..G\n";
        let grid = parse(text);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(2, 0), Some(Cell::Wall));
        assert_eq!(grid.get(2, 2), Some(Cell::Target));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.to_string(), text);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            "S.\n.".parse::<CellGrid>(),
            Err(RouteError::MalformedGrid(GridDefect::RaggedRows { .. }))
        ));
        assert!(matches!(
            "S?G".parse::<CellGrid>(),
            Err(RouteError::MalformedGrid(GridDefect::UnknownSymbol { symbol: '?', x: 1, y: 0 }))
        ));
    }

    #[test]
    fn node_ids_follow_row_major_order() {
        let gg = GridGraph::from_cells(&parse("S#.\n..G")).unwrap();
        let points: Vec<(i32, i32)> = gg.coordinates.iter().map(|(_, p)| (p.x, p.y)).collect();
        assert_eq!(points, vec![(0, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
        assert_eq!(gg.start, NodeId(0));
        assert_eq!(gg.target, NodeId(4));
        assert_eq!(gg.coordinates.node_at(Point::new(1, 0)), None);
        assert_eq!(gg.coordinates.node_at(Point::new(1, 1)), Some(NodeId(3)));
    }

    #[test]
    fn edges_are_paired_with_grid_costs() {
        let gg = GridGraph::from_cells(&parse("S.\n.G")).unwrap();
        // Every node of a 2x2 open grid touches the other three.
        assert_eq!(gg.graph.edge_count(), 12);
        for edge in gg.graph.edges() {
            assert_eq!(gg.graph.edge_weight(edge.to, edge.from), Some(edge.weight));
        }
        assert_eq!(gg.graph.edge_weight(NodeId(0), NodeId(1)), Some(1.0));
        assert_eq!(gg.graph.edge_weight(NodeId(0), NodeId(3)), Some(SQRT_2));
    }

    #[test]
    fn four_neighbourhood_drops_diagonals() {
        let grid = parse("S.\n.G");
        let gg = GridGraphBuilder::new().allow_diagonal(false).build(&grid).unwrap();
        assert_eq!(gg.graph.edge_count(), 8);
        assert_eq!(gg.graph.edge_weight(NodeId(0), NodeId(3)), None);
    }

    #[test]
    fn endpoint_defects() {
        let defect = |s: &str| match GridGraph::from_cells(&parse(s)) {
            Err(RouteError::MalformedGrid(d)) => d,
            other => panic!("expected malformed grid, got {:?}", other),
        };
        assert_eq!(defect("...\n..G"), GridDefect::MissingStart);
        assert_eq!(defect("S..\n..."), GridDefect::MissingTarget);
        assert_eq!(
            defect("S.S\n..G"),
            GridDefect::DuplicateStart(Point::new(0, 0), Point::new(2, 0))
        );
        assert_eq!(
            defect("SG.\n..G"),
            GridDefect::DuplicateTarget(Point::new(1, 0), Point::new(2, 1))
        );
        assert_eq!(defect("S#.\n##G"), GridDefect::IsolatedStart(Point::new(0, 0)));
        assert_eq!(defect("S.#\n.##\n##G"), GridDefect::IsolatedTarget(Point::new(2, 2)));
    }

    /// Diagonal neighbours still connect the start in the 8-neighbourhood but not in the
    /// 4-neighbourhood.
    #[test]
    fn diagonal_switch_isolation() {
        let grid = parse("S#\n#G");
        assert!(GridGraph::from_cells(&grid).is_ok());
        let four = GridGraphBuilder::new().allow_diagonal(false).build(&grid);
        assert!(matches!(
            four,
            Err(RouteError::MalformedGrid(GridDefect::IsolatedStart(_)))
        ));
    }

    #[test]
    fn disconnected_endpoints_build_but_are_unreachable() {
        let gg = GridGraph::from_cells(&parse("S.#..\n..#.G")).unwrap();
        assert!(!gg.reachable());
        let gg = GridGraph::from_cells(&parse("S.#..\n....G")).unwrap();
        assert!(gg.reachable());
    }

    #[test]
    fn empty_grid() {
        let grid = CellGrid::new(0, 3, Cell::Walkable);
        assert!(matches!(
            GridGraph::from_cells(&grid),
            Err(RouteError::MalformedGrid(GridDefect::EmptyGrid))
        ));
        assert!(matches!(
            CellGrid::from_cells(2, 2, vec![Cell::Wall; 3]),
            Err(RouteError::MalformedGrid(GridDefect::DimensionMismatch { expected: 4, actual: 3 }))
        ));
    }
}
