use grid_util::point::Point;
use itertools::Itertools;
use log::error;

use crate::error::{Result, RouteError, Violation};
use crate::grid_graph::CoordinateMap;
use crate::route::Route;

/// Anything a route can be drawn onto. Implemented by [Raster](crate::raster::Raster); image
/// libraries can be plugged in by implementing it for their buffer types.
pub trait Canvas {
    type Marker: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Marks a single cell. Only called with points inside `width` x `height`.
    fn mark(&mut self, point: Point, marker: Self::Marker);
}

/// Maps every route node to its grid position. With `skip_endpoints` the first and last node
/// are left out, since start and target cells already carry their own markers.
pub fn overlay_coordinates(
    route: &Route,
    coordinates: &CoordinateMap,
    skip_endpoints: bool,
) -> Result<Vec<Point>> {
    let nodes = route.nodes();
    let nodes = if skip_endpoints {
        nodes.get(1..nodes.len().saturating_sub(1)).unwrap_or(&[])
    } else {
        nodes
    };
    nodes
        .iter()
        .map(|&node| {
            coordinates.coordinate(node).ok_or_else(|| {
                let violation = Violation::MissingCoordinate(node);
                error!("{}", violation);
                RouteError::from(violation)
            })
        })
        .collect()
}

/// Paints `points` onto `canvas`, skipping any that fall outside it. Returns how many cells
/// were painted.
pub fn paint<C: Canvas>(canvas: &mut C, points: &[Point], marker: C::Marker) -> usize {
    let (w, h) = (canvas.width(), canvas.height());
    let mut painted = 0;
    for &p in points {
        if p.x >= 0 && p.y >= 0 && (p.x as usize) < w && (p.y as usize) < h {
            canvas.mark(p, marker);
            painted += 1;
        }
    }
    painted
}

/// Reduces a step-by-step path to the points where its direction changes, keeping both ends.
pub fn waypoints(path: &[Point]) -> Vec<Point> {
    let Some((&first, &last)) = path.first().zip(path.last()) else {
        return Vec::new();
    };
    let mut waypoints = vec![first];
    for (a, b, c) in path.iter().tuple_windows() {
        let incoming = (b.x - a.x, b.y - a.y);
        let outgoing = (c.x - b.x, c.y - b.y);
        if incoming != outgoing {
            waypoints.push(*b);
        }
    }
    if path.len() > 1 {
        waypoints.push(last);
    }
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::grid_graph::GridGraph;
    use crate::route::reconstruct;
    use crate::search::shortest_path;

    struct Marks {
        size: usize,
        marked: Vec<(Point, char)>,
    }

    impl Canvas for Marks {
        type Marker = char;
        fn width(&self) -> usize {
            self.size
        }
        fn height(&self) -> usize {
            self.size
        }
        fn mark(&mut self, point: Point, marker: char) {
            self.marked.push((point, marker));
        }
    }

    fn corridor() -> GridGraph {
        GridGraph::from_cells(&"S...G".parse().unwrap()).unwrap()
    }

    fn route_of(gg: &GridGraph) -> Route {
        let result = shortest_path(&gg.graph, gg.start);
        reconstruct(&result, gg.start, gg.target).unwrap()
    }

    #[test]
    fn coordinates_with_and_without_endpoints() {
        let gg = corridor();
        let route = route_of(&gg);
        let all = overlay_coordinates(&route, &gg.coordinates, false).unwrap();
        assert_eq!(all, (0..5).map(|x| Point::new(x, 0)).collect::<Vec<_>>());
        let inner = overlay_coordinates(&route, &gg.coordinates, true).unwrap();
        assert_eq!(inner, (1..4).map(|x| Point::new(x, 0)).collect::<Vec<_>>());
    }

    #[test]
    fn short_routes_have_no_interior() {
        let gg = corridor();
        let result = shortest_path(&gg.graph, gg.start);
        for (target, len) in [(NodeId(0), 1), (NodeId(1), 2)] {
            let route = reconstruct(&result, gg.start, target).unwrap();
            assert_eq!(route.len(), len);
            assert!(overlay_coordinates(&route, &gg.coordinates, true)
                .unwrap()
                .is_empty());
        }
        assert!(overlay_coordinates(&Route::empty(), &gg.coordinates, false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_coordinate_is_a_violation() {
        let gg = corridor();
        let route = route_of(&gg);
        let err = overlay_coordinates(&route, &CoordinateMap::default(), false).unwrap_err();
        assert!(matches!(
            err,
            RouteError::InvariantViolation(Violation::MissingCoordinate(_))
        ));
    }

    #[test]
    fn paint_clips_to_canvas() {
        let mut canvas = Marks {
            size: 2,
            marked: Vec::new(),
        };
        let points = [Point::new(0, 0), Point::new(1, 1), Point::new(2, 0), Point::new(-1, 0)];
        assert_eq!(paint(&mut canvas, &points, 'x'), 2);
        assert_eq!(
            canvas.marked,
            vec![(Point::new(0, 0), 'x'), (Point::new(1, 1), 'x')]
        );
    }

    #[test]
    fn waypoints_keep_turns() {
        let path: Vec<Point> = [(0, 0), (1, 0), (2, 0), (3, 1), (4, 2), (4, 3)]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        assert_eq!(
            waypoints(&path),
            vec![
                Point::new(0, 0),
                Point::new(2, 0),
                Point::new(4, 2),
                Point::new(4, 3)
            ]
        );
        assert_eq!(waypoints(&path[..1]), vec![Point::new(0, 0)]);
        assert!(waypoints(&[]).is_empty());
    }
}
