//! Per-arm ridge-regression sufficient statistics shared by the linear
//! policies.
//!
//! Each arm keeps the design matrix `A = λI + Σ x xᵀ`, its inverse (updated
//! incrementally with Sherman–Morrison so scoring never re-inverts), and the
//! reward-weighted feature sum `b = Σ r·x`. The ridge term `λ·I` (λ > 0)
//! guarantees `A` is symmetric positive-definite before any observation, so
//! cold-start arms score with the widest confidence ellipsoid and every
//! rank-one update preserves positive-definiteness.

use crate::linalg::{add_outer, dot, mat_vec};

#[derive(Debug, Clone)]
pub(crate) struct RidgeArm {
    /// Design matrix `A` (row-major `d×d`).
    pub a: Vec<f64>,
    /// `A⁻¹`, maintained incrementally.
    pub a_inv: Vec<f64>,
    /// Reward accumulator `b`.
    pub b: Vec<f64>,
    /// Observations folded into this arm.
    pub uses: u64,
    dim: usize,
}

impl RidgeArm {
    pub fn new(dim: usize, lambda: f64) -> Self {
        let lambda = if lambda.is_finite() && lambda > 0.0 {
            lambda
        } else {
            1.0
        };
        let mut a = vec![0.0; dim * dim];
        let mut a_inv = vec![0.0; dim * dim];
        for i in 0..dim {
            a[i * dim + i] = lambda;
            a_inv[i * dim + i] = 1.0 / lambda;
        }
        Self {
            a,
            a_inv,
            b: vec![0.0; dim],
            uses: 0,
            dim,
        }
    }

    /// Regression weights `θ = A⁻¹ b`.
    pub fn theta(&self) -> Vec<f64> {
        mat_vec(&self.a_inv, self.dim, &self.b)
    }

    /// Predicted mean reward `θ · x`.
    pub fn mean(&self, x: &[f64]) -> f64 {
        dot(&self.theta(), x)
    }

    /// Confidence half-width squared, `xᵀ A⁻¹ x` (clamped at zero against
    /// round-off).
    pub fn variance(&self, x: &[f64]) -> f64 {
        dot(x, &mat_vec(&self.a_inv, self.dim, x)).max(0.0)
    }

    /// Fold in one observation: `A += x xᵀ`, `b += r·x`, and the matching
    /// Sherman–Morrison rank-one update of `A⁻¹`:
    /// `A⁻¹ ← A⁻¹ − (A⁻¹x)(A⁻¹x)ᵀ / (1 + xᵀA⁻¹x)`.
    pub fn observe(&mut self, x: &[f64], reward: f64) {
        let d = self.dim;
        let ax = mat_vec(&self.a_inv, d, x);
        let denom = 1.0 + dot(x, &ax);
        if denom.is_finite() && denom > 1e-12 {
            for i in 0..d {
                for j in 0..d {
                    self.a_inv[i * d + j] -= (ax[i] * ax[j]) / denom;
                }
            }
        }
        add_outer(&mut self.a, d, x);
        for (bi, xi) in self.b.iter_mut().zip(x.iter()) {
            *bi += reward * xi;
        }
        self.uses = self.uses.saturating_add(1);
    }
}
