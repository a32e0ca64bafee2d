//! Seedable random number generation.
//!
//! Every operator and algorithm receives its generator explicitly; there is
//! no process-wide random source. Runs with the same seed are bit-for-bit
//! reproducible.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Creates a deterministic generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from an optional seed, drawing a fresh one when absent.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// Uniform draw in `[low, high)`; returns `low` when the range is empty.
pub(crate) fn uniform(rng: &mut dyn RngCore, low: f64, high: f64) -> f64 {
    if high > low {
        rng.random_range(low..high)
    } else {
        low
    }
}
