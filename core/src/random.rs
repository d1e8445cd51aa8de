//! Injectable randomness shared by every non-deterministic decision.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of random samples consumed by the game-master systems.
///
/// Systems never reach for a global generator; they borrow a source from the
/// orchestrator so a seeded or scripted implementation reproduces a run.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform integer in `0..bound`. A zero bound yields zero.
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        let scaled = (self.next_unit() * bound as f32) as u32;
        scaled.min(bound - 1)
    }

    /// Returns `true` with the provided probability.
    fn chance(&mut self, probability: f32) -> bool {
        self.next_unit() < probability
    }

    /// Uniform duration in `[min, max]`.
    fn between(&mut self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        min + (max - min).mul_f32(self.next_unit())
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_unit(&mut self) -> f32 {
        (**self).next_unit()
    }

    fn below(&mut self, bound: u32) -> u32 {
        (**self).below(bound)
    }
}

/// Reproducible random source backed by a ChaCha8 stream.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a new source seeded with the provided value.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }
}
