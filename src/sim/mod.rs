//! Deterministic game logic
//!
//! All gameplay rules live here. This module must stay pure:
//! - Randomness only through location-keyed `luck`
//! - Stable iteration order (cells are kept sorted)
//! - No rendering or platform dependencies

pub mod board;
pub mod cache;
pub mod command;
pub mod inventory;
pub mod luck;
pub mod state;

pub use board::{Board, Bounds, Cell, LatLng, ParseCellError};
pub use cache::{Geocache, MementoError, coin_count, count_key, presence_key};
pub use command::{Command, CommandError, Outcome, apply};
pub use inventory::{Coin, TransferError, move_all, move_by_id, move_one};
pub use luck::{luck, luck_with_seed, spawns};
pub use state::{Direction, GameState, ParseDirectionError};
