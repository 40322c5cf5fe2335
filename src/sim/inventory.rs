//! Coins and the transfer rules between collections
//!
//! `move_one` is last-in-first-out: it pops the most recently added coin.
//! Moving a particular coin goes through `move_by_id` instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::Cell;

/// An opaque collectible identifier, `#<serial>@<cell>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coin(String);

impl Coin {
    /// Mint the `serial`-th coin of `cell`
    pub fn mint(cell: Cell, serial: u32) -> Self {
        Self(format!("#{serial}@{cell}"))
    }

    /// Wrap an existing label
    pub fn from_label(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// Cell the coin was minted at, if the label is well-formed
    pub fn origin(&self) -> Option<Cell> {
        self.0.split_once('@')?.1.parse().ok()
    }

    /// Serial number within the origin cache
    pub fn serial(&self) -> Option<u32> {
        self.0.strip_prefix('#')?.split_once('@')?.0.parse().ok()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a transfer did nothing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("nothing to move")]
    Empty,
    #[error("coin {0} is not here")]
    NotFound(Coin),
}

/// Move the last coin of `source` to the end of `dest`
pub fn move_one(source: &mut Vec<Coin>, dest: &mut Vec<Coin>) -> Result<Coin, TransferError> {
    let coin = source.pop().ok_or(TransferError::Empty)?;
    dest.push(coin.clone());
    Ok(coin)
}

/// Move one specific coin, found by identity
pub fn move_by_id(
    source: &mut Vec<Coin>,
    dest: &mut Vec<Coin>,
    coin: &Coin,
) -> Result<(), TransferError> {
    let index = source
        .iter()
        .position(|c| c == coin)
        .ok_or_else(|| TransferError::NotFound(coin.clone()))?;
    dest.push(source.remove(index));
    Ok(())
}

/// Move every coin of `source` to `dest`, preserving order. Returns the count moved.
pub fn move_all(source: &mut Vec<Coin>, dest: &mut Vec<Coin>) -> usize {
    let moved = source.len();
    dest.append(source);
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coins(labels: &[&str]) -> Vec<Coin> {
        labels.iter().map(|l| Coin::from_label(*l)).collect()
    }

    #[test]
    fn test_move_one_is_lifo() {
        let mut cache = coins(&["#1@X", "#2@X"]);
        let mut inventory = Vec::new();

        let moved = move_one(&mut cache, &mut inventory).unwrap();
        assert_eq!(moved.label(), "#2@X");
        assert_eq!(cache, coins(&["#1@X"]));
        assert_eq!(inventory, coins(&["#2@X"]));
    }

    #[test]
    fn test_move_one_empty_is_noop() {
        let mut source = Vec::new();
        let mut dest = coins(&["#1@Y"]);

        assert_eq!(move_one(&mut source, &mut dest), Err(TransferError::Empty));
        assert!(source.is_empty());
        assert_eq!(dest, coins(&["#1@Y"]));
    }

    #[test]
    fn test_move_by_id() {
        let mut source = coins(&["#1@X", "#2@X", "#3@X"]);
        let mut dest = Vec::new();

        move_by_id(&mut source, &mut dest, &Coin::from_label("#2@X")).unwrap();
        assert_eq!(source, coins(&["#1@X", "#3@X"]));
        assert_eq!(dest, coins(&["#2@X"]));

        let missing = Coin::from_label("#9@X");
        assert_eq!(
            move_by_id(&mut source, &mut dest, &missing),
            Err(TransferError::NotFound(missing))
        );
        assert_eq!(source.len(), 2);
        assert_eq!(dest.len(), 1);
    }

    #[test]
    fn test_move_all_appends_in_order() {
        let mut source = coins(&["#1@X", "#2@X"]);
        let mut dest = coins(&["#5@Z"]);

        assert_eq!(move_all(&mut source, &mut dest), 2);
        assert!(source.is_empty());
        assert_eq!(dest, coins(&["#5@Z", "#1@X", "#2@X"]));
    }

    #[test]
    fn test_coin_label_parts() {
        let coin = Coin::mint(Cell::new(369995, -1220533), 3);
        assert_eq!(coin.label(), "#3@369995,-1220533");
        assert_eq!(coin.origin(), Some(Cell::new(369995, -1220533)));
        assert_eq!(coin.serial(), Some(3));

        let odd = Coin::from_label("loose change");
        assert_eq!(odd.origin(), None);
        assert_eq!(odd.serial(), None);
    }

    proptest! {
        #[test]
        fn prop_move_all_empties_source(a in 0usize..20, b in 0usize..20) {
            let mut source: Vec<Coin> = (0..a).map(|n| Coin::mint(Cell::new(1, 1), n as u32)).collect();
            let mut dest: Vec<Coin> = (0..b).map(|n| Coin::mint(Cell::new(2, 2), n as u32)).collect();

            let moved = move_all(&mut source, &mut dest);
            prop_assert!(source.is_empty());
            prop_assert_eq!(moved, a);
            prop_assert_eq!(dest.len(), a + b);
        }

        #[test]
        fn prop_move_one_conserves_coins(a in 0usize..20, b in 0usize..20) {
            let mut source: Vec<Coin> = (0..a).map(|n| Coin::mint(Cell::new(1, 1), n as u32)).collect();
            let mut dest: Vec<Coin> = (0..b).map(|n| Coin::mint(Cell::new(2, 2), n as u32)).collect();

            let result = move_one(&mut source, &mut dest);
            prop_assert_eq!(result.is_ok(), a > 0);
            prop_assert_eq!(source.len() + dest.len(), a + b);
        }
    }
}
