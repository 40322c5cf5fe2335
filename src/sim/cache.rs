//! Cache generation and the per-cell memento

use serde::{Deserialize, Serialize};

use super::board::Cell;
use super::inventory::Coin;
use super::luck::{luck_with_seed, spawns};
use crate::lerp;
use crate::settings::Rules;

/// Key rolled to decide whether a cell holds a cache
pub fn presence_key(cell: Cell) -> String {
    format!("presence:{cell}")
}

/// Key rolled to size a cache
pub fn count_key(cell: Cell) -> String {
    format!("count:{cell}")
}

/// State of one grid cell
///
/// `present` is fixed at generation. Only `coins` changes afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geocache {
    pub cell: Cell,
    pub present: bool,
    pub coins: Vec<Coin>,
}

/// Failure to rebuild state from a memento string
#[derive(Debug, thiserror::Error)]
pub enum MementoError {
    #[error("malformed memento: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("memento key {key} does not match cell {cell}")]
    KeyMismatch { key: String, cell: Cell },
    #[error("unsupported save version {0}")]
    Version(u32),
    #[error(transparent)]
    Cell(#[from] super::board::ParseCellError),
    #[error("cell {0} has no cache but holds coins")]
    AbsentWithCoins(Cell),
}

impl Geocache {
    /// Roll a cell's contents from its coordinate
    pub fn generate(cell: Cell, rules: &Rules) -> Self {
        let present = spawns(rules.seed, &presence_key(cell), rules.spawn_probability);
        let coins = if present {
            let count = coin_count(cell, rules);
            (1..=count).map(|serial| Coin::mint(cell, serial)).collect()
        } else {
            Vec::new()
        };
        Self {
            cell,
            present,
            coins,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Flat string encoding of this cell
    pub fn to_memento(&self) -> String {
        // Plain struct of strings, bools and ints; serialization can't fail
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_memento(memento: &str) -> Result<Self, MementoError> {
        let cache: Geocache = serde_json::from_str(memento)?;
        if !cache.present && !cache.coins.is_empty() {
            return Err(MementoError::AbsentWithCoins(cache.cell));
        }
        Ok(cache)
    }
}

/// Coin count for a present cache, in `[min_coins, max_coins]`
pub fn coin_count(cell: Cell, rules: &Rules) -> u32 {
    let t = luck_with_seed(rules.seed, &count_key(cell));
    let count = lerp(rules.min_coins as f64, rules.max_coins as f64, t).round() as u32;
    count.clamp(rules.min_coins, rules.max_coins)
}
