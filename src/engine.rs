//! The bandit engine: one policy, a fixed arm table, a fixed dimension.
//!
//! Arms and dimension are established at construction and never change; the
//! policy is (re)initialized by `fit` and then learns online through
//! `update`. Every entry point validates arm membership and context length
//! before touching any policy state, so a rejected call leaves the learned
//! statistics exactly as they were.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecommendError, Result};
use crate::policy::{PolicyKind, PolicyModel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ordered price-tier multipliers (e.g. `[0.9, 1.0, 1.1]`). Declaration
    /// order is the tie-break order.
    pub arms: Vec<f64>,
    /// Context-vector length the policy is built for.
    pub dimension: usize,
    pub policy: PolicyKind,
    /// Seed for the policy's random source (stochastic policies only).
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arms: vec![0.9, 1.0, 1.1],
            dimension: 0,
            policy: PolicyKind::default(),
            seed: 0,
        }
    }
}

pub struct BanditEngine {
    arms: Vec<f64>,
    dim: usize,
    kind: PolicyKind,
    seed: u64,
    policy: PolicyModel,
    fitted: bool,
    updates: u64,
}

impl BanditEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        if config.arms.is_empty() {
            return Err(RecommendError::Config("arm set is empty".into()));
        }
        if config.arms.iter().any(|a| !a.is_finite()) {
            return Err(RecommendError::Config(
                "arm multipliers must be finite".into(),
            ));
        }
        for (i, a) in config.arms.iter().enumerate() {
            if config.arms[..i].iter().any(|b| b.to_bits() == a.to_bits()) {
                return Err(RecommendError::Config(format!("duplicate arm {a}")));
            }
        }
        if config.dimension == 0 {
            return Err(RecommendError::Config(
                "context dimension must be at least 1".into(),
            ));
        }

        let policy = PolicyModel::new(
            config.policy,
            config.arms.len(),
            config.dimension,
            config.seed,
        );
        Ok(Self {
            arms: config.arms,
            dim: config.dimension,
            kind: config.policy,
            seed: config.seed,
            policy,
            fitted: false,
            updates: 0,
        })
    }

    pub fn arms(&self) -> &[f64] {
        &self.arms
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn policy_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Updates applied since the last `fit` (including the fit triples).
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    /// Arms are declared constants, so bit-pattern equality is an exact
    /// membership test.
    fn arm_index(&self, tier: f64) -> Result<usize> {
        self.arms
            .iter()
            .position(|a| a.to_bits() == tier.to_bits())
            .ok_or(RecommendError::InvalidArm(tier))
    }

    fn check_context(&self, context: &[f64]) -> Result<Vec<f64>> {
        if context.len() != self.dim {
            return Err(RecommendError::DimensionMismatch {
                expected: self.dim,
                actual: context.len(),
            });
        }
        Ok(context
            .iter()
            .map(|v| if v.is_finite() { *v } else { 0.0 })
            .collect())
    }

    /// Initialize the policy from a batch of historical triples, applying one
    /// update per `(decision, reward, context)` in the given order.
    ///
    /// Order matters for epsilon-greedy's running means; the linear policies'
    /// sufficient statistics are order-insensitive. The whole batch is
    /// validated before the policy is rebuilt, so a bad triple rejects the
    /// fit without disturbing a previously fitted engine.
    pub fn fit(
        &mut self,
        decisions: &[f64],
        rewards: &[f64],
        contexts: &[Vec<f64>],
    ) -> Result<()> {
        if decisions.is_empty() {
            return Err(RecommendError::Config("fit batch is empty".into()));
        }
        if decisions.len() != rewards.len() || decisions.len() != contexts.len() {
            return Err(RecommendError::Config(format!(
                "fit batch lengths differ: {} decisions, {} rewards, {} contexts",
                decisions.len(),
                rewards.len(),
                contexts.len()
            )));
        }

        let mut batch = Vec::with_capacity(decisions.len());
        for ((tier, reward), context) in decisions.iter().zip(rewards).zip(contexts) {
            let arm = self.arm_index(*tier)?;
            let x = self.check_context(context)?;
            batch.push((arm, *reward, x));
        }

        self.policy = PolicyModel::new(self.kind, self.arms.len(), self.dim, self.seed);
        self.updates = 0;
        for (arm, reward, x) in &batch {
            self.policy.update(*arm, *reward, x);
            self.updates += 1;
        }
        self.fitted = true;
        debug!(
            policy = self.policy_name(),
            n = batch.len(),
            dim = self.dim,
            "engine fitted"
        );
        Ok(())
    }

    /// Recommend a tier for this context.
    pub fn predict(&mut self, context: &[f64]) -> Result<f64> {
        if !self.fitted {
            return Err(RecommendError::NotFitted);
        }
        let x = self.check_context(context)?;
        let arm = self.policy.select(&x);
        Ok(self.arms[arm])
    }

    /// Per-tier expectations for this context, in arm order. Stochastic
    /// policies resample per call.
    pub fn expectations(&mut self, context: &[f64]) -> Result<Vec<(f64, f64)>> {
        if !self.fitted {
            return Err(RecommendError::NotFitted);
        }
        let x = self.check_context(context)?;
        let scores = self.policy.score(&x);
        Ok(self.arms.iter().copied().zip(scores).collect())
    }

    /// Fold one observed reward into the chosen arm's model. The online
    /// learning entry point; callable arbitrarily many times after `fit`.
    pub fn update(&mut self, arm: f64, reward: f64, context: &[f64]) -> Result<()> {
        if !self.fitted {
            return Err(RecommendError::NotFitted);
        }
        let idx = self.arm_index(arm)?;
        let x = self.check_context(context)?;
        self.policy.update(idx, reward, &x);
        self.updates += 1;
        Ok(())
    }
}
