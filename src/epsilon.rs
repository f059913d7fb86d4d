//! Epsilon-greedy over incremental per-arm running means.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::policy::argmax_stable;

/// With probability `epsilon` explore uniformly; otherwise exploit the arm
/// with the highest running mean reward. Means are maintained incrementally
/// (no stored history), and ties resolve to arm declaration order.
///
/// An arm with zero updates has mean 0.0. Rewards here are profits and can
/// be negative, so untried arms compete at zero rather than being forced
/// ahead of or behind the pack.
#[derive(Debug, Clone)]
pub(crate) struct EpsilonGreedy {
    epsilon: f64,
    means: Vec<f64>,
    counts: Vec<u64>,
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(n_arms: usize, epsilon: f64, seed: u64) -> Self {
        let epsilon = if epsilon.is_finite() {
            epsilon.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            epsilon,
            means: vec![0.0; n_arms],
            counts: vec![0; n_arms],
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn score(&self) -> Vec<f64> {
        self.means.clone()
    }

    pub fn select(&mut self) -> usize {
        // epsilon == 0 never touches the RNG, so greedy runs are fully
        // deterministic.
        if self.epsilon > 0.0 && self.rng.random::<f64>() < self.epsilon {
            return self.rng.random_range(0..self.means.len());
        }
        argmax_stable(&self.means)
    }

    pub fn update(&mut self, arm: usize, reward: f64) {
        let reward = if reward.is_finite() { reward } else { 0.0 };
        self.counts[arm] += 1;
        let n = self.counts[arm] as f64;
        self.means[arm] += (reward - self.means[arm]) / n;
    }
}
