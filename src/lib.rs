//! Geocoin Carrier - A location-based coin collecting game
//!
//! Core modules:
//! - `sim`: Deterministic game logic (cache generation, board, inventory, commands)
//! - `renderer`: WebGPU map rendering and click picking
//! - `platform`: Browser/native storage abstraction
//! - `persistence`: Save/load of the player memento
//! - `settings`: Game rules and player preferences

pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use persistence::SaveSlot;
pub use settings::{Rules, Settings};

/// Game configuration constants
pub mod consts {
    /// Size of one grid cell in degrees of latitude/longitude
    pub const TILE_DEGREES: f64 = 1e-4;
    /// Visibility radius in cells around the player
    pub const NEIGHBORHOOD_SIZE: i32 = 8;
    /// Largest configurable visibility radius
    pub const MAX_NEIGHBORHOOD_SIZE: i32 = 64;
    /// Chance that any given cell holds a cache
    pub const CACHE_SPAWN_PROBABILITY: f64 = 0.1;

    /// Coin count bounds for a freshly generated cache (inclusive)
    pub const MIN_COINS: u32 = 1;
    pub const MAX_COINS: u32 = 10;
    /// Largest configurable coin count for one cache
    pub const COIN_LIMIT: u32 = 1000;

    /// Where a new player starts (Oakes College classroom)
    pub const START_LAT: f64 = 36.98949379578401;
    pub const START_LNG: f64 = -122.06277128548504;

    /// Maximum positions kept in the movement trail
    pub const MAX_TRAIL_POINTS: usize = 512;

    /// Memento format version
    pub const SAVE_VERSION: u32 = 1;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
