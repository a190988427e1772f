//! # raster_route
//!
//! Finds the lowest-cost route between two cells of a raster image and draws it back onto the
//! image. The raster is classified with a colour [Palette](raster::Palette) into walls, walkable
//! cells, one start and one target, turned into an 8-connected grid graph (orthogonal steps
//! cost 1, diagonal steps cost √2) and searched with
//! [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm).
//!
//! Ties between equally distant nodes are broken by ascending node id, so results are fully
//! deterministic. All search state is created per call; graphs are immutable once built and
//! can be shared between threads.
pub mod error;
pub mod graph;
pub mod grid_graph;
pub mod overlay;
pub mod raster;
pub mod route;
pub mod search;

use core::fmt;

use grid_util::point::Point;
use log::info;

pub use crate::error::{GridDefect, Result, RouteError, Violation};
pub use crate::graph::{Edge, Graph, Node, NodeId};
pub use crate::grid_graph::{Cell, CellGrid, CoordinateMap, GridGraph, GridGraphBuilder};
pub use crate::overlay::{overlay_coordinates, paint, waypoints, Canvas};
pub use crate::raster::{Palette, Raster, Rgb};
pub use crate::route::{reconstruct, Route};
pub use crate::search::{shortest_path, DijkstraSearch, SearchResult};

/// Cost of a horizontal or vertical step.
pub const ORTHOGONAL_COST: f64 = 1.0;
/// Cost of a diagonal step.
pub const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

/// A raster together with the graph built from it: reads the raster, finds the route between
/// its start and target cells and draws that route onto a copy of the raster.
#[derive(Clone, Debug)]
pub struct RasterMap {
    pub raster: Raster,
    pub palette: Palette,
    pub grid: GridGraph,
    pub search: DijkstraSearch,
}

impl RasterMap {
    /// Classifies `raster` with `palette` and builds its 8-connected graph.
    pub fn read(raster: Raster, palette: Palette) -> Result<RasterMap> {
        let cells = raster.classify(&palette);
        Self::with_builder(raster, palette, &cells, &GridGraphBuilder::default())
    }

    /// Renders `cells` into a raster with `palette` (walkable cells white) and builds the map
    /// using `builder`.
    pub fn from_cells(
        cells: &CellGrid,
        palette: Palette,
        builder: &GridGraphBuilder,
    ) -> Result<RasterMap> {
        let mut raster = Raster::new(cells.width(), cells.height(), raster::WHITE);
        for (colour, kind) in [
            (palette.wall, Cell::Wall),
            (palette.start, Cell::Start),
            (palette.target, Cell::Target),
        ] {
            for p in cells.positions(kind) {
                raster.set(p.x, p.y, colour);
            }
        }
        Self::with_builder(raster, palette, cells, builder)
    }

    fn with_builder(
        raster: Raster,
        palette: Palette,
        cells: &CellGrid,
        builder: &GridGraphBuilder,
    ) -> Result<RasterMap> {
        let grid = builder.build(cells)?;
        Ok(RasterMap {
            raster,
            palette,
            grid,
            search: DijkstraSearch::default().early_exit(true),
        })
    }

    /// Lowest-cost route from the start cell to the target cell, empty if the target cannot be
    /// reached.
    pub fn find_route(&self) -> Result<Route> {
        let (start, target) = (self.grid.start, self.grid.target);
        if !self.grid.reachable() {
            info!("{} is not reachable from {}", target, start);
            return Ok(Route::empty());
        }
        info!("{} is reachable from {}, computing route", target, start);
        let result = self.search.run(&self.grid.graph, start, Some(target))?;
        reconstruct(&result, start, target)
    }

    /// Total edge weight along `route`, [None] for an empty route.
    pub fn route_cost(&self, route: &Route) -> Option<f64> {
        if route.is_empty() {
            None
        } else {
            route.cost(&self.grid.graph)
        }
    }

    /// Grid positions of `route`, start and target included.
    pub fn route_points(&self, route: &Route) -> Result<Vec<Point>> {
        overlay_coordinates(route, &self.grid.coordinates, false)
    }

    /// Copy of the raster with the interior cells of `route` painted in the palette's route
    /// colour. Start and target keep their own colours.
    pub fn draw_route(&self, route: &Route) -> Result<Raster> {
        let mut with_route = self.raster.clone();
        let points = overlay_coordinates(route, &self.grid.coordinates, true)?;
        paint(&mut with_route, &points, self.palette.route);
        Ok(with_route)
    }
}

impl fmt::Display for RasterMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.raster.classify(&self.palette))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(text: &str) -> RasterMap {
        let cells: CellGrid = text.parse().unwrap();
        RasterMap::from_cells(&cells, Palette::default(), &GridGraphBuilder::default()).unwrap()
    }

    #[test]
    fn from_cells_renders_palette_colours() {
        let map = map("S#\n.G");
        assert_eq!(map.raster.get(0, 0), Some(raster::GREEN));
        assert_eq!(map.raster.get(1, 0), Some(raster::BLACK));
        assert_eq!(map.raster.get(0, 1), Some(raster::WHITE));
        assert_eq!(map.raster.get(1, 1), Some(raster::RED));
        assert_eq!(map.to_string(), "S#\n.G\n");
    }

    #[test]
    fn draw_route_skips_endpoints() {
        let map = map("S..G");
        let route = map.find_route().unwrap();
        assert_eq!(route.len(), 4);
        assert_eq!(map.route_cost(&route), Some(3.0));
        let drawn = map.draw_route(&route).unwrap();
        assert_eq!(drawn.get(0, 0), Some(raster::GREEN));
        assert_eq!(drawn.get(1, 0), Some(raster::BLUE));
        assert_eq!(drawn.get(2, 0), Some(raster::BLUE));
        assert_eq!(drawn.get(3, 0), Some(raster::RED));
        // The source raster is untouched.
        assert_eq!(map.raster.get(1, 0), Some(raster::WHITE));
    }

    #[test]
    fn unreachable_target_draws_nothing() {
        let map = map("S.#..\n..#.G");
        let route = map.find_route().unwrap();
        assert!(route.is_empty());
        assert_eq!(map.route_cost(&route), None);
        assert_eq!(map.draw_route(&route).unwrap(), map.raster);
    }
}
