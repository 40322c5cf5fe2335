//! Deterministic location-keyed randomness
//!
//! Every decision about a cell is derived from a string key, so revisiting a
//! coordinate reproduces the same outcome without storing it first.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash of a string key
#[inline]
pub fn hash_key(key: &str) -> u64 {
    key.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Pseudo-random value in [0, 1) for `key` under the default world seed
#[inline]
pub fn luck(key: &str) -> f64 {
    luck_with_seed(0, key)
}

/// Pseudo-random value in [0, 1) for `key` under `seed`
pub fn luck_with_seed(seed: u64, key: &str) -> f64 {
    let mixed = hash_key(key) ^ seed.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    let mut rng = Pcg32::seed_from_u64(mixed);
    rng.random::<f64>()
}

/// True iff `key` rolls above `1 - probability`
#[inline]
pub fn spawns(seed: u64, key: &str, probability: f64) -> bool {
    luck_with_seed(seed, key) > 1.0 - probability
}
