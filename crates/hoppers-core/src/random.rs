//! Random source for movement draws.
//!
//! Every move consumes one draw `r` in `[-1.0, 1.0]` and displaces the entity
//! by `r * gold`. The [`RandomSource`] trait abstracts where draws come from
//! so tests can substitute a [`FixedSequence`] and the command-line harness
//! can pick a [`SeededRandom`] for reproducible runs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[-1.0, 1.0]`.
pub trait RandomSource {
    /// Produce the next draw. Implementations must stay within `[-1.0, 1.0]`.
    fn next_unit(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Unseeded draws from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl ThreadRandom {
    /// Create a new thread-local random source.
    pub const fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::rng().random_range(-1.0..=1.0)
    }
}

/// Reproducible draws from a seeded [`SmallRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    /// Create a source that replays the same draws for the same seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.random_range(-1.0..=1.0)
    }
}

/// Cycles through a fixed list of draws. An empty list always yields `0.0`.
///
/// Values outside `[-1.0, 1.0]` are clamped; NaN becomes `0.0`.
#[derive(Debug, Clone, Default)]
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedSequence {
    /// Create a sequence over `values`.
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) })
            .collect();
        Self { values, cursor: 0 }
    }

    /// A sequence that never moves anything.
    pub const fn still() -> Self {
        Self {
            values: Vec::new(),
            cursor: 0,
        }
    }
}

impl RandomSource for FixedSequence {
    fn next_unit(&mut self) -> f64 {
        let Some(value) = self.values.get(self.cursor).copied() else {
            return 0.0;
        };
        self.cursor = self.cursor.saturating_add(1);
        if self.cursor >= self.values.len() {
            self.cursor = 0;
        }
        value
    }
}
