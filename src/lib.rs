//! `repricer`: contextual-bandit price-tier recommendation for used-device
//! listings.
//!
//! The problem shape: a listing comes in with device attributes and market
//! context, the engine recommends one of a small set of price-adjustment
//! tiers (e.g. `0.9`, `1.0`, `1.1` × base price), and the realized profit
//! arrives later — sometimes much later — as a deferred reward. The engine
//! closes that loop and improves its recommendations from the feedback.
//!
//! **Pipeline:** raw listing → [`ContextEncoder`] (one-hot + numeric blocks,
//! fixed length for the engine's lifetime) → [`BanditEngine::predict`] → tier
//! + decision id held by the [`DecisionLedger`] → outcome reported →
//! [`BanditEngine::update`]. The [`RewardConfig`] profit model only runs at
//! bootstrap/evaluation time; in live serving the reward is whatever the
//! business observed.
//!
//! **Goals:**
//! - **Deterministic by default**: seeded RNGs everywhere; LinUCB scoring is
//!   reproducible bit for bit, Thompson sampling replays under a fixed seed.
//! - **Numerically safe**: per-arm design matrices are ridge-regularized at
//!   initialization, updated by rank-one Sherman–Morrison steps that keep
//!   them symmetric positive-definite for any real-valued context.
//! - **Exactly-once accounting**: a decision id can be consumed at most
//!   once, so a retried outcome report can never double-count into the
//!   learned state.
//! - **Small K**: designed for a handful of tiers, not hundreds of arms.
//!
//! **Selection policies** ([`PolicyKind`]): random baseline, epsilon-greedy
//! over running means, linear UCB, linear Thompson sampling.
//!
//! **Serving vs. analysis:** [`PricingService`] is the live facade (`fit` /
//! `recommend` / `report`); [`evaluate`] replays historical data through
//! fresh engines to rank policy configurations by average reward and regret.
//!
//! **Non-goals:** no HTTP surface, file loading, currency conversion, or
//! plotting (thin glue owned by callers); no ledger persistence; no
//! coordination across server instances.

#![forbid(unsafe_code)]

/// Epsilon used for floating-point tie-breaking in arm selection.
///
/// Avoids exact equality comparisons on f64 scores; near-equal scores
/// resolve to arm declaration order.
pub(crate) const TIEBREAK_EPS: f64 = 1e-12;

mod bootstrap;
mod epsilon;
mod linalg;
mod linear;
mod lints;
mod linucb;
mod random;

mod error;
pub use error::{RecommendError, Result};

mod record;
pub use record::{InventoryLevel, ListingRecord, MarketSegment};

mod encoder;
pub use encoder::{CategoricalField, ContextEncoder, EncoderConfig, NumericField, ScalingMode};

mod policy;
pub use policy::PolicyKind;

mod engine;
pub use engine::{BanditEngine, EngineConfig};

mod ledger;
pub use ledger::{DecisionLedger, DecisionRecord};

mod reward;
pub use reward::{RewardConfig, TierParams};

mod service;
pub use service::{PricingService, Recommendation, ServiceConfig};

mod evaluate;
pub use evaluate::{
    evaluate, standard_suite, EvalConfig, EvalReport, PolicyEvaluation, PolicySpec,
};
