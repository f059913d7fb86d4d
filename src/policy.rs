//! Policy configuration and the common score/select/update contract.
//!
//! Policies are interchangeable behind [`PolicyModel`]: the engine picks one
//! at construction and never changes it. All four share the same three-method
//! surface — `score` (per-arm expectations, arm order), `select` (arm index),
//! `update` (fold one observed reward into that arm's state) — with arm and
//! dimension validation done by the engine before any call lands here.

use serde::{Deserialize, Serialize};

use crate::epsilon::EpsilonGreedy;
use crate::lints::LinTs;
use crate::linucb::LinUcb;
use crate::random::RandomPolicy;
use crate::TIEBREAK_EPS;

/// Which learning policy an engine runs, with its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyKind {
    /// Uniform arm choice, no learning. Baseline.
    Random,
    /// Explore with probability `epsilon`, otherwise exploit the best
    /// running-mean arm.
    EpsilonGreedy { epsilon: f64 },
    /// Deterministic linear UCB: `θ·x + alpha·√(xᵀA⁻¹x)`.
    LinUcb { alpha: f64, lambda: f64 },
    /// Linear Thompson sampling: `θ̃ ~ N(θ, alpha²·A⁻¹)`, argmax of `θ̃·x`.
    LinTs { alpha: f64, lambda: f64 },
}

impl PolicyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Random => "random",
            PolicyKind::EpsilonGreedy { .. } => "epsilon_greedy",
            PolicyKind::LinUcb { .. } => "lin_ucb",
            PolicyKind::LinTs { .. } => "lin_ts",
        }
    }
}

impl Default for PolicyKind {
    fn default() -> Self {
        // The serving default mirrors the original deployment: Thompson
        // sampling with moderate exploration.
        PolicyKind::LinTs {
            alpha: 1.5,
            lambda: 1.0,
        }
    }
}

/// First index whose score beats every earlier one by more than the
/// tie-break epsilon — i.e. ties resolve to arm declaration order.
pub(crate) fn argmax_stable(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] + TIEBREAK_EPS {
            best = i;
        }
    }
    best
}

/// One policy instance, dispatched by kind.
#[derive(Debug, Clone)]
pub(crate) enum PolicyModel {
    Random(RandomPolicy),
    EpsilonGreedy(EpsilonGreedy),
    LinUcb(LinUcb),
    LinTs(LinTs),
}

impl PolicyModel {
    pub fn new(kind: PolicyKind, n_arms: usize, dim: usize, seed: u64) -> Self {
        match kind {
            PolicyKind::Random => PolicyModel::Random(RandomPolicy::new(n_arms, seed)),
            PolicyKind::EpsilonGreedy { epsilon } => {
                PolicyModel::EpsilonGreedy(EpsilonGreedy::new(n_arms, epsilon, seed))
            }
            PolicyKind::LinUcb { alpha, lambda } => {
                PolicyModel::LinUcb(LinUcb::new(n_arms, dim, alpha, lambda))
            }
            PolicyKind::LinTs { alpha, lambda } => {
                PolicyModel::LinTs(LinTs::new(n_arms, dim, alpha, lambda, seed))
            }
        }
    }

    /// Per-arm expectations for this context, in arm declaration order.
    /// Stochastic policies resample on every call.
    pub fn score(&mut self, context: &[f64]) -> Vec<f64> {
        match self {
            PolicyModel::Random(p) => p.score(),
            PolicyModel::EpsilonGreedy(p) => p.score(),
            PolicyModel::LinUcb(p) => p.score(context),
            PolicyModel::LinTs(p) => p.score(context),
        }
    }

    pub fn select(&mut self, context: &[f64]) -> usize {
        match self {
            PolicyModel::Random(p) => p.select(),
            PolicyModel::EpsilonGreedy(p) => p.select(),
            PolicyModel::LinUcb(p) => p.select(context),
            PolicyModel::LinTs(p) => p.select(context),
        }
    }

    pub fn update(&mut self, arm: usize, reward: f64, context: &[f64]) {
        match self {
            PolicyModel::Random(_) => {}
            PolicyModel::EpsilonGreedy(p) => p.update(arm, reward),
            PolicyModel::LinUcb(p) => p.update(arm, reward, context),
            PolicyModel::LinTs(p) => p.update(arm, reward, context),
        }
    }
}
