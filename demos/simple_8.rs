use raster_route::{
    overlay_coordinates, reconstruct, shortest_path, waypoints, CellGrid, GridGraph,
};

// In this example a route is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  G|
//  ___
// where
// - # marks a wall
// - S marks the start
// - G marks the target
//
// Nodes have an 8-neighborhood

fn main() -> raster_route::Result<()> {
    let cells: CellGrid = "S..\n.#.\n..G".parse()?;
    print!("{}", cells);
    let grid = GridGraph::from_cells(&cells)?;
    let result = shortest_path(&grid.graph, grid.start);
    let route = reconstruct(&result, grid.start, grid.target)?;
    println!("Cost: {:.3}", result.distance(grid.target));
    println!("Route:");
    let points = overlay_coordinates(&route, &grid.coordinates, false)?;
    for p in &points {
        println!("{:?}", p);
    }
    println!("Waypoints: {:?}", waypoints(&points));
    Ok(())
}
