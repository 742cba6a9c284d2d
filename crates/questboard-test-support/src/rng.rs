//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use questboard_core::rng::DeterministicRng;

/// A no-op RNG that always returns `min`. Suitable for manual initiative,
/// where no die is rolled.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns values from a scripted sequence, one per die roll, in
/// the order the engine draws them. Panics if the script runs out.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }

    /// Whether every scripted value has been drawn.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.values.len()
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let Some(&val) = self.values.get(self.index) else {
            panic!(
                "SequenceRng exhausted after {} value(s); a roll in [{min}, {max}] was requested",
                self.values.len()
            );
        };
        self.index += 1;
        val
    }
}
