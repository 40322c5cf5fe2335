//! Game rules and player preferences
//!
//! Persisted separately from the game save in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::LatLng;

/// Rejected rule values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RulesError {
    #[error("tile size must be positive and coarse enough to index the globe, got {0}")]
    TileSize(f64),
    #[error("neighborhood size must be within 0..={max}, got {0}", max = MAX_NEIGHBORHOOD_SIZE)]
    Neighborhood(i32),
    #[error("spawn probability must be within [0, 1], got {0}")]
    Probability(f64),
    #[error("coin range {min}..={max} is invalid (need 1 <= min <= max <= {limit})", limit = COIN_LIMIT)]
    CoinRange { min: u32, max: u32 },
}

/// Parameters that shape the generated world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Grid spacing in degrees
    pub tile_degrees: f64,
    /// Visibility radius in cells
    pub neighborhood_size: i32,
    /// Chance a cell holds a cache
    pub spawn_probability: f64,
    /// Coin count bounds for new caches (inclusive)
    pub min_coins: u32,
    pub max_coins: u32,
    /// World seed mixed into every roll
    pub seed: u64,
    /// Where new players start
    pub start: LatLng,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            tile_degrees: TILE_DEGREES,
            neighborhood_size: NEIGHBORHOOD_SIZE,
            spawn_probability: CACHE_SPAWN_PROBABILITY,
            min_coins: MIN_COINS,
            max_coins: MAX_COINS,
            seed: 0,
            start: LatLng::new(START_LAT, START_LNG),
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<(), RulesError> {
        // Every cell index within the radius of any longitude must fit in i32
        let max_index = 180.0 / self.tile_degrees + MAX_NEIGHBORHOOD_SIZE as f64;
        if !(self.tile_degrees > 0.0 && self.tile_degrees.is_finite())
            || max_index >= i32::MAX as f64
        {
            return Err(RulesError::TileSize(self.tile_degrees));
        }
        if !(0..=MAX_NEIGHBORHOOD_SIZE).contains(&self.neighborhood_size) {
            return Err(RulesError::Neighborhood(self.neighborhood_size));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(RulesError::Probability(self.spawn_probability));
        }
        if self.min_coins == 0 || self.min_coins > self.max_coins || self.max_coins > COIN_LIMIT {
            return Err(RulesError::CoinRange {
                min: self.min_coins,
                max: self.max_coins,
            });
        }
        Ok(())
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World generation rules
    pub rules: Rules,

    /// Move the marker with device geolocation
    pub follow_geolocation: bool,
    /// Draw the movement history polyline
    pub show_trail: bool,
    /// Save after every state-changing command
    pub auto_save: bool,
    /// Map zoom, in screen pixels per cell
    pub pixels_per_cell: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            follow_geolocation: false,
            show_trail: true,
            auto_save: true,
            pixels_per_cell: 24.0,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "geocoin_settings";

    /// Parse stored settings, falling back to defaults when invalid
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => match settings.rules.validate() {
                Ok(()) => settings,
                Err(e) => {
                    log::warn!("Stored rules rejected ({}), using defaults", e);
                    Self {
                        rules: Rules::default(),
                        ..settings
                    }
                }
            },
            Err(e) => {
                log::warn!("Stored settings unreadable ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings from a key/value store
    pub fn load(storage: &dyn crate::platform::Storage) -> Self {
        match storage.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => {
                log::info!("Loaded settings");
                Self::from_json(&json)
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings storage unavailable ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to a key/value store
    pub fn save(&self, storage: &mut dyn crate::platform::Storage) {
        if let Ok(json) = serde_json::to_string(self) {
            match storage.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    #[test]
    fn test_default_rules_valid() {
        assert_eq!(Rules::default().validate(), Ok(()));
    }

    #[test]
    fn test_rules_rejections() {
        let bad_tile = Rules {
            tile_degrees: 0.0,
            ..Rules::default()
        };
        assert!(matches!(bad_tile.validate(), Err(RulesError::TileSize(_))));

        let bad_prob = Rules {
            spawn_probability: 1.5,
            ..Rules::default()
        };
        assert!(matches!(bad_prob.validate(), Err(RulesError::Probability(_))));

        let zero_min = Rules {
            min_coins: 0,
            ..Rules::default()
        };
        assert!(matches!(zero_min.validate(), Err(RulesError::CoinRange { .. })));

        let inverted = Rules {
            min_coins: 5,
            max_coins: 2,
            ..Rules::default()
        };
        assert!(matches!(inverted.validate(), Err(RulesError::CoinRange { .. })));
    }

    #[test]
    fn test_tile_too_fine_for_i32_rejected() {
        let fine = Rules {
            tile_degrees: 1e-9,
            ..Rules::default()
        };
        assert_eq!(fine.validate(), Err(RulesError::TileSize(1e-9)));

        // Just coarse enough: 180 / 1e-7 = 1.8e9 < i32::MAX
        let coarse = Rules {
            tile_degrees: 1e-7,
            ..Rules::default()
        };
        assert_eq!(coarse.validate(), Ok(()));
    }

    #[test]
    fn test_neighborhood_bounds() {
        let negative = Rules {
            neighborhood_size: -1,
            ..Rules::default()
        };
        assert_eq!(negative.validate(), Err(RulesError::Neighborhood(-1)));

        let huge = Rules {
            neighborhood_size: 1_000_000,
            ..Rules::default()
        };
        assert_eq!(huge.validate(), Err(RulesError::Neighborhood(1_000_000)));

        let widest = Rules {
            neighborhood_size: MAX_NEIGHBORHOOD_SIZE,
            ..Rules::default()
        };
        assert_eq!(widest.validate(), Ok(()));
    }

    #[test]
    fn test_coin_limit() {
        let huge = Rules {
            max_coins: u32::MAX,
            ..Rules::default()
        };
        assert!(matches!(huge.validate(), Err(RulesError::CoinRange { .. })));

        let at_limit = Rules {
            max_coins: COIN_LIMIT,
            ..Rules::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
    }

    #[test]
    fn test_oversized_rules_from_storage_fall_back() {
        let settings = Settings::from_json(r#"{"rules": {"neighborhood_size": 1000000}}"#);
        assert_eq!(settings.rules, Rules::default());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"show_trail": false}"#);
        assert!(!settings.show_trail);
        assert_eq!(settings.rules, Rules::default());
    }

    #[test]
    fn test_invalid_rules_reset_but_prefs_kept() {
        let settings =
            Settings::from_json(r#"{"auto_save": false, "rules": {"min_coins": 9, "max_coins": 1}}"#);
        assert!(!settings.auto_save);
        assert_eq!(settings.rules, Rules::default());
    }

    #[test]
    fn test_garbage_json_defaults() {
        assert_eq!(Settings::from_json("{{{"), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::default();
        let settings = Settings {
            follow_geolocation: true,
            ..Settings::default()
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }
}
