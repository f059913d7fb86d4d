//! Deterministic linear UCB.

use crate::linear::RidgeArm;
use crate::policy::argmax_stable;

/// Per-arm ridge regression with an upper-confidence exploration bonus:
/// `score_a(x) = θ_a·x + alpha·√(xᵀ A_a⁻¹ x)`.
///
/// Scoring has no randomness at all — given the same fit/update history the
/// scores are reproducible bit for bit. Under-observed arms carry the larger
/// `A⁻¹`, hence the larger bonus, which is the cold-start exploration
/// incentive.
#[derive(Debug, Clone)]
pub(crate) struct LinUcb {
    alpha: f64,
    arms: Vec<RidgeArm>,
}

impl LinUcb {
    pub fn new(n_arms: usize, dim: usize, alpha: f64, lambda: f64) -> Self {
        let alpha = if alpha.is_finite() && alpha >= 0.0 {
            alpha
        } else {
            0.0
        };
        Self {
            alpha,
            arms: (0..n_arms).map(|_| RidgeArm::new(dim, lambda)).collect(),
        }
    }

    pub fn score(&self, context: &[f64]) -> Vec<f64> {
        self.arms
            .iter()
            .map(|arm| arm.mean(context) + self.alpha * arm.variance(context).sqrt())
            .collect()
    }

    pub fn select(&mut self, context: &[f64]) -> usize {
        argmax_stable(&self.score(context))
    }

    pub fn update(&mut self, arm: usize, reward: f64, context: &[f64]) {
        let reward = if reward.is_finite() { reward } else { 0.0 };
        self.arms[arm].observe(context, reward);
    }

    #[cfg(test)]
    pub(crate) fn arm_state(&self, arm: usize) -> &RidgeArm {
        &self.arms[arm]
    }
}
