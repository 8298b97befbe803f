//! Random draws shared by the engines
//!
//! Every engine owns its own `ChaCha8Rng`, so a seed fully determines card
//! placement, problems and grid order.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// RNG type owned by each engine
pub type GameRng = ChaCha8Rng;

/// Build an engine RNG from an optional seed, falling back to OS entropy
pub fn seeded_rng(seed: Option<u64>) -> GameRng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Uniform integer in `[min, max]` inclusive. A degenerate range yields `min`.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}

/// In-place Fisher-Yates shuffle
pub fn shuffle<T, R: Rng + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffled copy of `items`
pub fn shuffled<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> Vec<T> {
    let mut out = items.to_vec();
    shuffle(rng, &mut out);
    out
}
