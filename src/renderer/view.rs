//! Map projection: geographic coordinates <-> screen pixels
//!
//! Screen space has the origin at the top-left, x right, y down.
//! Offsets from the center are computed in f64 before narrowing to f32.

use glam::Vec2;

use crate::sim::{Cell, LatLng};

/// Camera over the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    /// Geographic point at the middle of the screen
    pub center: LatLng,
    /// Zoom
    pub pixels_per_degree: f64,
    /// Viewport size in logical pixels
    pub size: Vec2,
}

impl MapView {
    pub fn new(center: LatLng, pixels_per_cell: f32, tile_degrees: f64, size: Vec2) -> Self {
        Self {
            center,
            pixels_per_degree: pixels_per_cell as f64 / tile_degrees,
            size,
        }
    }

    pub fn to_screen(&self, p: LatLng) -> Vec2 {
        let dx = (p.lng - self.center.lng) * self.pixels_per_degree;
        let dy = (p.lat - self.center.lat) * self.pixels_per_degree;
        Vec2::new(self.size.x / 2.0 + dx as f32, self.size.y / 2.0 - dy as f32)
    }

    pub fn to_geo(&self, screen: Vec2) -> LatLng {
        let dx = (screen.x - self.size.x / 2.0) as f64;
        let dy = (screen.y - self.size.y / 2.0) as f64;
        LatLng::new(
            self.center.lat - dy / self.pixels_per_degree,
            self.center.lng + dx / self.pixels_per_degree,
        )
    }

    /// Screen-space rectangle (min, max) of a cell
    pub fn cell_rect(&self, cell: Cell, tile_degrees: f64) -> (Vec2, Vec2) {
        let bounds = cell.bounds(tile_degrees);
        // North is up, so the north-west corner is the screen minimum
        let min = self.to_screen(LatLng::new(bounds.north_east.lat, bounds.south_west.lng));
        let max = self.to_screen(LatLng::new(bounds.south_west.lat, bounds.north_east.lng));
        (min, max)
    }

    /// Cell under a click
    pub fn pick(&self, screen: Vec2, tile_degrees: f64) -> Cell {
        Cell::containing(self.to_geo(screen), tile_degrees)
    }

    /// True if any part of the rectangle is on screen
    pub fn is_on_screen(&self, min: Vec2, max: Vec2) -> bool {
        max.x >= 0.0 && max.y >= 0.0 && min.x <= self.size.x && min.y <= self.size.y
    }

    /// Logical pixels to normalized device coordinates
    pub fn to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            screen.x / self.size.x * 2.0 - 1.0,
            1.0 - screen.y / self.size.y * 2.0,
        )
    }
}
