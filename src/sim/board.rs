//! Discretized map grid and the lazily populated cache store

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cache::Geocache;
use crate::settings::Rules;

/// A geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Offset by a number of degrees
    pub fn offset(self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }
}

/// Axis-aligned geographic rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }

    /// True if `other` lies entirely inside this rectangle
    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.contains(other.south_west) && self.contains(other.north_east)
    }
}

/// Discretized coordinate of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub i: i32,
    pub j: i32,
}

impl Cell {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Cell containing `point` at the given tile size
    pub fn containing(point: LatLng, tile_degrees: f64) -> Self {
        Self {
            i: (point.lat / tile_degrees).floor() as i32,
            j: (point.lng / tile_degrees).floor() as i32,
        }
    }

    pub fn bounds(&self, tile_degrees: f64) -> Bounds {
        let south_west = LatLng::new(self.i as f64 * tile_degrees, self.j as f64 * tile_degrees);
        Bounds::new(
            south_west,
            south_west.offset(tile_degrees, tile_degrees),
        )
    }

    /// Chebyshev distance in cells
    pub fn distance(&self, other: Cell) -> u32 {
        self.i.abs_diff(other.i).max(self.j.abs_diff(other.j))
    }

    /// Cell offset by whole cells, clamped to the edge of the index range
    pub fn saturating_offset(self, di: i32, dj: i32) -> Cell {
        Cell::new(self.i.saturating_add(di), self.j.saturating_add(dj))
    }

    /// All cells within `radius` of this one, row-major from the south-west
    ///
    /// Cells past the edge of the i32 index range are skipped.
    pub fn neighborhood(self, radius: i32) -> impl Iterator<Item = Cell> {
        (-radius..=radius).flat_map(move |di| {
            (-radius..=radius).filter_map(move |dj| {
                Some(Cell::new(self.i.checked_add(di)?, self.j.checked_add(dj)?))
            })
        })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

/// Error parsing a `"i,j"` cell key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell key {0:?}")]
pub struct ParseCellError(pub String);

impl FromStr for Cell {
    type Err = ParseCellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCellError(s.to_string());
        let (i, j) = s.split_once(',').ok_or_else(err)?;
        Ok(Cell::new(
            i.trim().parse().map_err(|_| err())?,
            j.trim().parse().map_err(|_| err())?,
        ))
    }
}

/// Every cell the player has ever requested, keyed by coordinate
///
/// Cells are generated on first request and never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    caches: BTreeMap<Cell, Geocache>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cell's state, generating it on first request
    pub fn cache_at(&mut self, cell: Cell, rules: &Rules) -> &mut Geocache {
        self.caches
            .entry(cell)
            .or_insert_with(|| Geocache::generate(cell, rules))
    }

    /// Cell state if it has been generated
    pub fn get(&self, cell: Cell) -> Option<&Geocache> {
        self.caches.get(&cell)
    }

    /// Generate every cell in `radius` around `center` and return the present ones
    pub fn populate_around(&mut self, center: Cell, radius: i32, rules: &Rules) -> Vec<Cell> {
        center
            .neighborhood(radius)
            .filter(|&cell| self.cache_at(cell, rules).present)
            .collect()
    }

    pub fn insert(&mut self, cache: Geocache) {
        self.caches.insert(cache.cell, cache);
    }

    /// Replace all contents in place
    pub fn replace_all(&mut self, caches: impl IntoIterator<Item = Geocache>) {
        self.caches.clear();
        for cache in caches {
            self.insert(cache);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Geocache> {
        self.caches.values()
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}
