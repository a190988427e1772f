use raster_route::raster::{BLACK, BLUE, GREEN, RED, WHITE};
use raster_route::{Palette, Raster, RasterMap, Rgb};

// Draws a route across a small colour-keyed raster and prints it as text, one character per
// pixel.

fn to_char(colour: Rgb) -> char {
    match colour {
        BLACK => '#',
        GREEN => 'S',
        RED => 'G',
        BLUE => '*',
        _ => '.',
    }
}

fn main() -> raster_route::Result<()> {
    let (w, h) = (12, 6);
    let mut raster = Raster::new(w, h, WHITE);
    for y in 0..5 {
        raster.set(4, y, BLACK);
    }
    for y in 1..6 {
        raster.set(8, y, BLACK);
    }
    raster.set(1, 4, GREEN);
    raster.set(10, 1, RED);

    let map = RasterMap::read(raster, Palette::default())?;
    let route = map.find_route()?;
    match map.route_cost(&route) {
        Some(cost) => println!("Route of {} cells, cost {:.3}", route.len(), cost),
        None => println!("No route"),
    }
    let drawn = map.draw_route(&route)?;
    for row in drawn.pixels().chunks(w) {
        println!("{}", row.iter().map(|&c| to_char(c)).collect::<String>());
    }
    Ok(())
}
