//! Random number generator abstraction for determinism.
//!
//! Initiative auto-rolls draw from a [`DeterministicRng`]. In production
//! this wraps a real RNG; in tests a seeded or scripted implementation is
//! injected so that turn order is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}

/// Rolls a single die with `sides` faces.
pub fn roll_die(rng: &mut dyn DeterministicRng, sides: u32) -> u32 {
    rng.next_u32_range(1, sides)
}

/// [`DeterministicRng`] backed by `rand`'s standard generator.
#[derive(Debug)]
pub struct StdDeterministicRng {
    inner: StdRng,
}

impl StdDeterministicRng {
    /// Seeds from the operating system's entropy source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Seeds from a fixed value, for replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl DeterministicRng for StdDeterministicRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.inner.random_range(min..=max)
    }
}
