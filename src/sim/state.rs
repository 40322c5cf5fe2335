//! Player state and the player-level memento
//!
//! Everything that must survive a reload lives here.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::board::{Board, Bounds, Cell, LatLng};
use super::cache::{Geocache, MementoError};
use super::inventory::Coin;
use crate::consts::{MAX_TRAIL_POINTS, SAVE_VERSION};
use crate::settings::Rules;

/// Compass direction for one-tile moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// (lat, lng) step in tiles
    pub fn delta(self) -> (f64, f64) {
        match self {
            Direction::North => (1.0, 0.0),
            Direction::South => (-1.0, 0.0),
            Direction::East => (0.0, 1.0),
            Direction::West => (0.0, -1.0),
        }
    }

}

/// Error parsing a direction name or arrow key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "n" | "north" | "up" | "arrowup" => Ok(Direction::North),
            "s" | "south" | "down" | "arrowdown" => Ok(Direction::South),
            "e" | "east" | "right" | "arrowright" => Ok(Direction::East),
            "w" | "west" | "left" | "arrowleft" => Ok(Direction::West),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// On-disk shape of the player memento
#[derive(Debug, Serialize, Deserialize)]
struct PlayerMemento {
    version: u32,
    position: LatLng,
    /// Cell key -> cell memento
    caches: BTreeMap<String, String>,
    coins: Vec<Coin>,
    #[serde(default)]
    trail: Vec<LatLng>,
}

/// Complete player state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Generation rules (not part of the memento)
    pub rules: Rules,
    /// Marker position
    pub position: LatLng,
    /// Every cell generated so far
    pub board: Board,
    /// Coins carried by the player
    pub inventory: Vec<Coin>,
    /// Cache whose popup is open
    pub opened: Option<Cell>,
    /// Movement history (oldest first)
    pub trail: Vec<LatLng>,
}

impl GameState {
    /// Fresh player at the rules' start position
    pub fn new(rules: Rules) -> Self {
        let start = rules.start;
        Self {
            rules,
            position: start,
            board: Board::new(),
            inventory: Vec::new(),
            opened: None,
            trail: vec![start],
        }
    }

    /// Cell under the marker
    pub fn player_cell(&self) -> Cell {
        Cell::containing(self.position, self.rules.tile_degrees)
    }

    /// Rectangle inside which caches are interactive
    pub fn visible_bounds(&self) -> Bounds {
        let center = self.player_cell();
        let r = self.rules.neighborhood_size;
        let tile = self.rules.tile_degrees;
        Bounds::new(
            center.saturating_offset(-r, -r).bounds(tile).south_west,
            center.saturating_offset(r, r).bounds(tile).north_east,
        )
    }

    pub fn is_visible(&self, cell: Cell) -> bool {
        self.visible_bounds()
            .contains_bounds(&cell.bounds(self.rules.tile_degrees))
    }

    /// Generate the neighborhood and return the present caches, sorted by cell
    pub fn visible_caches(&mut self) -> Vec<Cell> {
        let center = self.player_cell();
        self.board
            .populate_around(center, self.rules.neighborhood_size, &self.rules)
    }

    /// Relocate the marker and record it in the trail
    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
        self.trail.push(position);
        self.cap_trail();
        if let Some(cell) = self.opened {
            if !self.is_visible(cell) {
                log::debug!("Cache {} out of range, closing", cell);
                self.opened = None;
            }
        }
    }

    /// Keep only the newest `MAX_TRAIL_POINTS` positions
    fn cap_trail(&mut self) {
        if self.trail.len() > MAX_TRAIL_POINTS {
            let excess = self.trail.len() - MAX_TRAIL_POINTS;
            self.trail.drain(..excess);
        }
    }

    /// Move one tile
    pub fn step(&mut self, direction: Direction) {
        let (d_lat, d_lng) = direction.delta();
        let tile = self.rules.tile_degrees;
        self.set_position(self.position.offset(d_lat * tile, d_lng * tile));
    }

    /// The opened cache, if it is still in range
    pub fn opened_cache(&mut self) -> Option<&mut Geocache> {
        let cell = self.opened?;
        if !self.is_visible(cell) {
            return None;
        }
        Some(self.board.cache_at(cell, &self.rules))
    }

    /// Discard everything and return to the start
    pub fn reset(&mut self) {
        *self = Self::new(self.rules.clone());
    }

    /// Flat string encoding of position, board, inventory and trail
    pub fn to_memento(&self) -> String {
        let memento = PlayerMemento {
            version: SAVE_VERSION,
            position: self.position,
            caches: self
                .board
                .iter()
                .map(|cache| (cache.cell.to_string(), cache.to_memento()))
                .collect(),
            coins: self.inventory.clone(),
            trail: self.trail.clone(),
        };
        serde_json::to_string(&memento).unwrap_or_default()
    }

    /// Replace board, inventory and position from a memento
    ///
    /// The state is untouched when decoding fails.
    pub fn restore_memento(&mut self, memento: &str) -> Result<(), MementoError> {
        let decoded: PlayerMemento = serde_json::from_str(memento)?;
        if decoded.version != SAVE_VERSION {
            return Err(MementoError::Version(decoded.version));
        }

        let mut caches = Vec::with_capacity(decoded.caches.len());
        for (key, cell_memento) in &decoded.caches {
            let cache = Geocache::from_memento(cell_memento)?;
            let cell: Cell = key.parse()?;
            if cell != cache.cell {
                return Err(MementoError::KeyMismatch {
                    key: key.clone(),
                    cell: cache.cell,
                });
            }
            caches.push(cache);
        }

        self.board.replace_all(caches);
        self.inventory = decoded.coins;
        self.position = decoded.position;
        self.trail = decoded.trail;
        if self.trail.is_empty() {
            self.trail.push(self.position);
        }
        self.cap_trail();
        self.opened = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rich_rules() -> Rules {
        Rules {
            spawn_probability: 1.0,
            neighborhood_size: 2,
            ..Rules::default()
        }
    }

    #[test]
    fn test_new_state_at_start() {
        let state = GameState::new(Rules::default());
        assert_eq!(state.position, Rules::default().start);
        assert!(state.inventory.is_empty());
        assert!(state.board.is_empty());
        assert_eq!(state.trail.len(), 1);
    }

    #[test]
    fn test_step_moves_one_cell() {
        let mut state = GameState::new(Rules::default());
        let start = state.player_cell();

        state.step(Direction::North);
        assert_eq!(state.player_cell(), Cell::new(start.i + 1, start.j));
        state.step(Direction::East);
        assert_eq!(state.player_cell(), Cell::new(start.i + 1, start.j + 1));
        state.step(Direction::South);
        state.step(Direction::West);
        assert_eq!(state.player_cell(), start);
        assert_eq!(state.trail.len(), 5);
    }

    #[test]
    fn test_visibility_radius() {
        let state = GameState::new(rich_rules());
        let c = state.player_cell();
        assert!(state.is_visible(c));
        assert!(state.is_visible(Cell::new(c.i + 2, c.j - 2)));
        assert!(!state.is_visible(Cell::new(c.i + 3, c.j)));
        assert!(!state.is_visible(Cell::new(c.i, c.j - 3)));
    }

    #[test]
    fn test_visible_caches_populates_board() {
        let mut state = GameState::new(rich_rules());
        let caches = state.visible_caches();
        assert_eq!(state.board.len(), 25);
        assert!(caches.iter().all(|&cell| state.is_visible(cell)));
    }

    #[test]
    fn test_moving_away_closes_cache() {
        let mut state = GameState::new(rich_rules());
        let cell = state.player_cell();
        state.opened = Some(cell);
        state.step(Direction::North);
        state.step(Direction::North);
        assert_eq!(state.opened, Some(cell));
        state.step(Direction::North);
        assert_eq!(state.opened, None);
    }

    #[test]
    fn test_trail_is_capped() {
        let mut state = GameState::new(Rules::default());
        for _ in 0..(MAX_TRAIL_POINTS + 10) {
            state.step(Direction::East);
        }
        assert_eq!(state.trail.len(), MAX_TRAIL_POINTS);
        assert_eq!(state.trail.last(), Some(&state.position));
    }

    #[test]
    fn test_memento_round_trip() {
        let mut state = GameState::new(rich_rules());
        state.visible_caches();
        let cell = state.player_cell();
        state.opened = Some(cell);
        let coin = state.opened_cache().and_then(|cache| cache.coins.pop());
        state.inventory.extend(coin);
        state.step(Direction::West);

        let memento = state.to_memento();

        let mut restored = GameState::new(rich_rules());
        restored.restore_memento(&memento).unwrap();
        assert_eq!(restored.position, state.position);
        assert_eq!(restored.board, state.board);
        assert_eq!(restored.inventory, state.inventory);
        assert_eq!(restored.trail, state.trail);
        assert_eq!(restored.opened, None);
    }

    #[test]
    fn test_restore_replaces_in_place() {
        let mut source = GameState::new(rich_rules());
        source.step(Direction::North);
        let memento = source.to_memento();

        let mut target = GameState::new(rich_rules());
        target.visible_caches();
        target.inventory.push(Coin::from_label("#1@0,0"));
        target.restore_memento(&memento).unwrap();

        assert!(target.board.is_empty());
        assert!(target.inventory.is_empty());
        assert_eq!(target.position, source.position);
    }

    #[test]
    fn test_restore_failure_leaves_state() {
        let mut state = GameState::new(rich_rules());
        state.inventory.push(Coin::from_label("#1@0,0"));
        let before = state.clone();

        assert!(state.restore_memento("garbage").is_err());
        assert!(state.restore_memento(r#"{"version":1}"#).is_err());
        assert!(matches!(
            state.restore_memento(
                r#"{"version":99,"position":{"lat":0.0,"lng":0.0},"caches":{},"coins":[]}"#
            ),
            Err(MementoError::Version(99))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_restore_rejects_mismatched_key() {
        let cache = Geocache {
            cell: Cell::new(1, 1),
            present: true,
            coins: vec![Coin::mint(Cell::new(1, 1), 1)],
        };
        let mut caches = BTreeMap::new();
        caches.insert("2,2".to_string(), cache.to_memento());
        let memento = serde_json::to_string(&PlayerMemento {
            version: SAVE_VERSION,
            position: LatLng::new(0.0, 0.0),
            caches,
            coins: Vec::new(),
            trail: Vec::new(),
        })
        .unwrap();

        let mut state = GameState::new(Rules::default());
        assert!(matches!(
            state.restore_memento(&memento),
            Err(MementoError::KeyMismatch { .. })
        ));
    }

    fn memento_with(caches: BTreeMap<String, String>, trail: Vec<LatLng>) -> String {
        serde_json::to_string(&PlayerMemento {
            version: SAVE_VERSION,
            position: LatLng::new(0.0, 0.0),
            caches,
            coins: Vec::new(),
            trail,
        })
        .unwrap()
    }

    #[test]
    fn test_restore_rejects_coins_in_absent_cell() {
        let mut caches = BTreeMap::new();
        caches.insert(
            "1,1".to_string(),
            r##"{"cell":{"i":1,"j":1},"present":false,"coins":["#1@1,1"]}"##.to_string(),
        );
        let mut state = GameState::new(Rules::default());
        let before = state.clone();
        assert!(matches!(
            state.restore_memento(&memento_with(caches, Vec::new())),
            Err(MementoError::AbsentWithCoins(_))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_restore_caps_trail() {
        let trail = vec![LatLng::new(1.0, 2.0); MAX_TRAIL_POINTS * 3];
        let mut state = GameState::new(Rules::default());
        state
            .restore_memento(&memento_with(BTreeMap::new(), trail))
            .unwrap();
        assert_eq!(state.trail.len(), MAX_TRAIL_POINTS);
    }

    #[test]
    fn test_extreme_tile_size_does_not_overflow() {
        // Rules that bypassed validation still must not panic
        let rules = Rules {
            tile_degrees: 1e-9,
            neighborhood_size: 2,
            spawn_probability: 0.0,
            ..Rules::default()
        };
        let mut state = GameState::new(rules);
        assert_eq!(state.player_cell(), Cell::new(i32::MAX, i32::MIN));
        let bounds = state.visible_bounds();
        assert!(bounds.south_west.lat <= bounds.north_east.lat);
        assert!(state.visible_caches().is_empty());
        assert_eq!(state.board.len(), 9);
    }

    #[test]
    fn test_reset_keeps_rules() {
        let mut state = GameState::new(rich_rules());
        state.step(Direction::North);
        state.inventory.push(Coin::from_label("#1@0,0"));
        state.reset();
        assert_eq!(state, GameState::new(rich_rules()));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("N".parse(), Ok(Direction::North));
        assert_eq!("ArrowLeft".parse(), Ok(Direction::West));
        assert_eq!("up".parse(), Ok(Direction::North));
        assert_eq!(
            "x".parse::<Direction>(),
            Err(ParseDirectionError("x".to_string()))
        );
    }
}
