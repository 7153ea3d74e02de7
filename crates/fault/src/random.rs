//! Random sources for percentage sampling
//!
//! Every source yields a uniform draw in `[0, 100)`. Sources are shared by all
//! in-flight requests, so they must be usable concurrently.

use std::fmt;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Supplies one uniform percentage draw per sampling decision
pub trait RandomSource: Send + Sync + fmt::Debug {
    /// Draw a value uniformly distributed over `[0, 100)`
    fn percent(&self) -> f64;
}

/// Thread-local generator, lock-free across requests
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn percent(&self) -> f64 {
        rand::rng().random_range(0.0..100.0)
    }
}

/// Deterministic generator for reproducible sampling
pub struct SeededRandom {
    seed: u64,
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Create a generator producing the same sequence for the same seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seed this generator was created with
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandom")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl RandomSource for SeededRandom {
    fn percent(&self) -> f64 {
        self.rng.lock().random_range(0.0..100.0)
    }
}

/// Always returns the same draw
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(f64);

impl FixedRandom {
    /// Create a source returning `value` on every draw
    pub const fn new(value: f64) -> Self {
        Self(value)
    }
}

impl RandomSource for FixedRandom {
    fn percent(&self) -> f64 {
        self.0
    }
}
