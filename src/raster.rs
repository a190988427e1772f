use grid_util::point::Point;
use log::debug;

use crate::error::{GridDefect, Result};
use crate::grid_graph::{Cell, CellGrid};
use crate::overlay::Canvas;

pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];
pub const GREEN: Rgb = [0, 255, 0];
pub const RED: Rgb = [255, 0, 0];
pub const BLUE: Rgb = [0, 0, 255];

/// Colour keys used to read a raster and draw a route onto it. Any colour other than the
/// three keys is walkable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub wall: Rgb,
    pub start: Rgb,
    pub target: Rgb,
    pub route: Rgb,
}

impl Default for Palette {
    fn default() -> Palette {
        Palette {
            wall: BLACK,
            start: GREEN,
            target: RED,
            route: BLUE,
        }
    }
}

impl Palette {
    pub fn classify(&self, colour: Rgb) -> Cell {
        if colour == self.wall {
            Cell::Wall
        } else if colour == self.start {
            Cell::Start
        } else if colour == self.target {
            Cell::Target
        } else {
            Cell::Walkable
        }
    }
}

/// Decoded RGB image, row-major. Loading and saving files is left to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Raster {
    pub fn new(width: usize, height: usize, fill: Rgb) -> Raster {
        Raster {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Raster> {
        if pixels.len() != width * height {
            return Err(GridDefect::DimensionMismatch {
                expected: width * height,
                actual: pixels.len(),
            }
            .into());
        }
        Ok(Raster {
            width,
            height,
            pixels,
        })
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn ix(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        self.ix(x, y).map(|i| self.pixels[i])
    }

    pub fn set(&mut self, x: i32, y: i32, colour: Rgb) {
        if let Some(i) = self.ix(x, y) {
            self.pixels[i] = colour;
        }
    }

    /// Classifies every pixel with `palette`.
    pub fn classify(&self, palette: &Palette) -> CellGrid {
        let grid = CellGrid::from_fn(self.width, self.height, |x, y| {
            palette.classify(self.pixels[y * self.width + x])
        });
        debug!(
            "Classified {}x{} raster, {} wall pixels",
            self.width,
            self.height,
            grid.positions(Cell::Wall).count()
        );
        grid
    }
}

impl Canvas for Raster {
    type Marker = Rgb;

    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
    fn mark(&mut self, point: Point, marker: Rgb) {
        self.set(point.x, point.y, marker);
    }
}
