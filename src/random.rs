//! Uniform-random baseline policy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks arms uniformly and learns nothing. Exists so evaluation runs have a
/// floor to compare learning policies against.
#[derive(Debug, Clone)]
pub(crate) struct RandomPolicy {
    n_arms: usize,
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(n_arms: usize, seed: u64) -> Self {
        Self {
            n_arms,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn score(&self) -> Vec<f64> {
        vec![0.0; self.n_arms]
    }

    pub fn select(&mut self) -> usize {
        self.rng.random_range(0..self.n_arms)
    }
}
