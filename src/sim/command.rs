//! Player commands
//!
//! Every UI event turns into one `Command`, applied synchronously.

use super::board::{Cell, LatLng};
use super::inventory::{Coin, TransferError, move_all, move_by_id, move_one};
use super::state::{Direction, GameState};

/// One input from the UI or a sensor
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Step one tile
    Move(Direction),
    /// Jump to a position (geolocation)
    SetPosition(LatLng),
    /// Open the popup of the cache at a cell
    Open(Cell),
    /// Close the open popup
    Close,
    /// Cache -> inventory, one coin
    Take,
    /// Inventory -> cache, one coin
    Leave,
    /// Cache -> inventory, everything
    TakeAll,
    /// Inventory -> cache, everything
    LeaveAll,
    /// Cache -> inventory, a specific coin
    TakeCoin(Coin),
    /// Start over
    Reset,
}

/// Why a command was refused. Nothing changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("no cache is open")]
    NoOpenCache,
    #[error("cache {0} is out of range")]
    OutOfRange(Cell),
    #[error("there is no cache at {0}")]
    NoCache(Cell),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// What a successful command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Moved { cell: Cell },
    Opened { cell: Cell, coins: usize },
    Closed,
    Transferred { coins: usize },
    Reset,
}

impl Outcome {
    /// Whether the persisted state changed
    pub fn needs_save(&self) -> bool {
        !matches!(self, Outcome::Opened { .. } | Outcome::Closed)
    }
}

/// Which way coins flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Take,
    Leave,
}

/// Apply one command to the game state
pub fn apply(state: &mut GameState, command: &Command) -> Result<Outcome, CommandError> {
    match command {
        Command::Move(direction) => {
            state.step(*direction);
            Ok(Outcome::Moved {
                cell: state.player_cell(),
            })
        }
        Command::SetPosition(position) => {
            state.set_position(*position);
            Ok(Outcome::Moved {
                cell: state.player_cell(),
            })
        }
        Command::Open(cell) => open(state, *cell),
        Command::Close => {
            state.opened = None;
            Ok(Outcome::Closed)
        }
        Command::Take => transfer(state, Flow::Take, |src, dst| move_one(src, dst).map(|_| 1)),
        Command::Leave => transfer(state, Flow::Leave, |src, dst| move_one(src, dst).map(|_| 1)),
        Command::TakeAll => transfer(state, Flow::Take, |src, dst| {
            match move_all(src, dst) {
                0 => Err(TransferError::Empty),
                n => Ok(n),
            }
        }),
        Command::LeaveAll => transfer(state, Flow::Leave, |src, dst| {
            match move_all(src, dst) {
                0 => Err(TransferError::Empty),
                n => Ok(n),
            }
        }),
        Command::TakeCoin(coin) => transfer(state, Flow::Take, |src, dst| {
            move_by_id(src, dst, coin).map(|_| 1)
        }),
        Command::Reset => {
            state.reset();
            log::info!("Game reset");
            Ok(Outcome::Reset)
        }
    }
}

fn open(state: &mut GameState, cell: Cell) -> Result<Outcome, CommandError> {
    if !state.is_visible(cell) {
        return Err(CommandError::OutOfRange(cell));
    }
    let rules = state.rules.clone();
    let cache = state.board.cache_at(cell, &rules);
    if !cache.present {
        return Err(CommandError::NoCache(cell));
    }
    let coins = cache.coins.len();
    state.opened = Some(cell);
    Ok(Outcome::Opened { cell, coins })
}

fn transfer<F>(state: &mut GameState, flow: Flow, mv: F) -> Result<Outcome, CommandError>
where
    F: FnOnce(&mut Vec<Coin>, &mut Vec<Coin>) -> Result<usize, TransferError>,
{
    let cell = state.opened.ok_or(CommandError::NoOpenCache)?;
    if !state.is_visible(cell) {
        return Err(CommandError::OutOfRange(cell));
    }
    let cache = state.board.cache_at(cell, &state.rules);
    let coins = match flow {
        Flow::Take => mv(&mut cache.coins, &mut state.inventory)?,
        Flow::Leave => mv(&mut state.inventory, &mut cache.coins)?,
    };
    log::debug!("{:?} {} coin(s) at {}", flow, coins, cell);
    Ok(Outcome::Transferred { coins })
}
