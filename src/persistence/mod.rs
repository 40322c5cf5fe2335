//! Save/load of the player memento
//!
//! One string record under a fixed key. Missing or malformed data means
//! "no prior state": the record is dropped and the game starts fresh.

use crate::platform::{Storage, StorageError};
use crate::settings::Rules;
use crate::sim::GameState;

/// The single save record
pub struct SaveSlot<S: Storage> {
    storage: S,
}

impl<S: Storage> SaveSlot<S> {
    /// Storage key
    pub const KEY: &'static str = "geocoin_save";

    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Restore saved state, or `None` when there is nothing usable
    pub fn load(&mut self, rules: &Rules) -> Option<GameState> {
        let memento = match self.storage.get(Self::KEY) {
            Ok(Some(memento)) => memento,
            Ok(None) => {
                log::info!("No saved game found");
                return None;
            }
            Err(e) => {
                log::warn!("Save storage unreadable ({}), starting fresh", e);
                return None;
            }
        };

        let mut state = GameState::new(rules.clone());
        match state.restore_memento(&memento) {
            Ok(()) => {
                log::info!(
                    "Loaded saved game ({} cells, {} coins carried)",
                    state.board.len(),
                    state.inventory.len()
                );
                Some(state)
            }
            Err(e) => {
                log::warn!("Discarding malformed save: {}", e);
                self.clear();
                None
            }
        }
    }

    /// Saved state, or a fresh game
    pub fn load_or_new(&mut self, rules: &Rules) -> GameState {
        self.load(rules)
            .unwrap_or_else(|| GameState::new(rules.clone()))
    }

    pub fn save(&mut self, state: &GameState) -> Result<(), StorageError> {
        self.storage.set(Self::KEY, &state.to_memento())?;
        log::debug!("Game saved ({} cells)", state.board.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        match self.storage.remove(Self::KEY) {
            Ok(()) => log::info!("Saved game cleared"),
            Err(e) => log::warn!("Failed to clear save: {}", e),
        }
    }
}
