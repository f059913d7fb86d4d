//! The serving facade: fit once at startup, then recommend / report.
//!
//! This is the surface the HTTP layer calls. `recommend` composes encoder
//! transform + engine predict + ledger create; `report` composes ledger
//! consume + engine update. The engine sits behind a mutex so concurrent
//! updates on one arm can never interleave their matrix accumulation and no
//! reader observes a half-applied rank-one update; the ledger is atomic per
//! key on its own. Nothing here performs I/O, retries, or timeouts — those
//! belong to the caller.

use chrono::{Duration, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::bootstrap::bootstrap_triples;
use crate::encoder::{ContextEncoder, EncoderConfig};
use crate::engine::{BanditEngine, EngineConfig};
use crate::error::Result;
use crate::ledger::DecisionLedger;
use crate::policy::PolicyKind;
use crate::record::ListingRecord;
use crate::reward::RewardConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub arms: Vec<f64>,
    pub policy: PolicyKind,
    /// Seed for the policy's random source.
    pub seed: u64,
    /// Seed for the bootstrap tier-sampling RNG.
    pub bootstrap_seed: u64,
    pub encoder: EncoderConfig,
    pub reward: RewardConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            arms: vec![0.9, 1.0, 1.1],
            policy: PolicyKind::default(),
            seed: 0,
            bootstrap_seed: 0,
            encoder: EncoderConfig::default(),
            reward: RewardConfig::default(),
        }
    }
}

/// What `recommend` hands back to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub decision_id: Uuid,
    /// The recommended tier multiplier.
    pub tier: f64,
    /// Per-tier expectations at decision time, in arm order.
    pub expectations: Vec<(f64, f64)>,
}

/// One fitted deployment: encoder state, one engine, one ledger.
///
/// Constructed once at startup and shared by reference across request
/// handlers — there are no ambient singletons.
pub struct PricingService {
    encoder: ContextEncoder,
    engine: Mutex<BanditEngine>,
    ledger: DecisionLedger,
    policy_name: &'static str,
}

impl PricingService {
    /// Fit the encoder and engine from historical listings.
    ///
    /// Bootstrap decisions are sampled uniformly over the arms with the
    /// configured seed and priced by the reward model; from then on the
    /// engine learns only from reported outcomes.
    pub fn fit(records: &[ListingRecord], config: ServiceConfig) -> Result<Self> {
        let encoder = ContextEncoder::fit(records, config.encoder)?;
        let mut rng = StdRng::seed_from_u64(config.bootstrap_seed);
        let (decisions, rewards, contexts) =
            bootstrap_triples(records, &config.arms, &encoder, &config.reward, &mut rng);

        let mut engine = BanditEngine::new(EngineConfig {
            arms: config.arms,
            dimension: encoder.dim(),
            policy: config.policy,
            seed: config.seed,
        })?;
        engine.fit(&decisions, &rewards, &contexts)?;

        info!(
            policy = engine.policy_name(),
            records = records.len(),
            dim = encoder.dim(),
            "pricing service fitted"
        );
        Ok(Self {
            encoder,
            policy_name: engine.policy_name(),
            engine: Mutex::new(engine),
            ledger: DecisionLedger::new(),
        })
    }

    /// Recommend a tier for one listing and open an in-flight decision.
    pub fn recommend(&self, record: &ListingRecord) -> Result<Recommendation> {
        let context = self.encoder.transform(record);
        let (tier, expectations) = {
            let mut engine = self.engine.lock();
            let tier = engine.predict(&context)?;
            let expectations = engine.expectations(&context)?;
            (tier, expectations)
        };
        let decision_id = self.ledger.create(context, tier, self.policy_name);
        debug!(%decision_id, tier, "recommended price tier");
        Ok(Recommendation {
            decision_id,
            tier,
            expectations,
        })
    }

    /// Report the realized outcome for an earlier recommendation.
    ///
    /// The ledger's single-consume guarantee makes this exactly-once: a
    /// duplicate report fails with `NotFound` before any engine state is
    /// touched.
    pub fn report(&self, decision_id: Uuid, reward: f64) -> Result<()> {
        let record = self.ledger.consume(decision_id)?;
        self.engine
            .lock()
            .update(record.arm, reward, &record.context)?;
        debug!(%decision_id, tier = record.arm, reward, "outcome folded into policy");
        Ok(())
    }

    /// Number of decisions still awaiting an outcome.
    pub fn pending(&self) -> usize {
        self.ledger.len()
    }

    /// Evict decisions older than `max_age`. The core never calls this on
    /// its own; a caller that wants bounded ledger growth schedules it.
    pub fn sweep_stale(&self, max_age: Duration) -> usize {
        let evicted = self.ledger.sweep_older_than(Utc::now() - max_age);
        if evicted > 0 {
            info!(evicted, "swept stale decisions");
        }
        evicted
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy_name
    }

    pub fn context_dim(&self) -> usize {
        self.encoder.dim()
    }
}
