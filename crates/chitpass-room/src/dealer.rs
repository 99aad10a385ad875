//! Dealing: building the chit pool, shuffling, and splitting into hands.
//!
//! The pool for N players is exactly 4 copies of each of the first N
//! entity names, cycling through the configured list if it is shorter
//! than N. The shuffle is an unbiased Fisher–Yates (via `rand`), so the
//! dealer is parameterized over the RNG and deterministic under a seeded
//! one in tests.

use rand::seq::SliceRandom;
use rand::Rng;

/// Chits dealt to each player, and the size of a winning hand.
pub const HAND_SIZE: usize = 4;

/// Extends `names` with `Entity{K}` placeholders until it has at least
/// `n` entries. This mutation is permanent: once a placeholder is in
/// play its name must stay stable across snapshots and re-deals.
pub(crate) fn ensure_entities(names: &mut Vec<String>, n: usize) {
    while names.len() < n {
        names.push(format!("Entity{}", names.len() + 1));
    }
}

/// Builds the full pool for `n_players`: [`HAND_SIZE`] copies of each of
/// the first `n_players` entity names, cycling by index.
fn build_pool(names: &[String], n_players: usize) -> Vec<String> {
    let mut pool = Vec::with_capacity(n_players * HAND_SIZE);
    for i in 0..n_players {
        let entity = &names[i % names.len()];
        for _ in 0..HAND_SIZE {
            pool.push(entity.clone());
        }
    }
    pool
}

/// Shuffles the pool and deals contiguous runs of [`HAND_SIZE`], one run
/// per player, in the order the caller passes players.
pub(crate) fn deal<R: Rng + ?Sized>(
    names: &[String],
    n_players: usize,
    rng: &mut R,
) -> Vec<Vec<String>> {
    let mut pool = build_pool(names, n_players);
    pool.shuffle(rng);
    pool.chunks(HAND_SIZE).map(|chunk| chunk.to_vec()).collect()
}
