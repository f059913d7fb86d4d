//! Bootstrap training-triple synthesis.
//!
//! Historical listings carry no record of which tier was actually chosen, so
//! initial fitting samples a uniform random tier per record and prices it
//! with the reward model. The sampling distribution is an explicit, seeded
//! RNG owned by the caller — a convention of the bootstrap procedure, not a
//! learned signal, and nothing downstream may assume it reflects a real
//! historical policy.

use rand::rngs::StdRng;
use rand::Rng;

use crate::encoder::ContextEncoder;
use crate::record::ListingRecord;
use crate::reward::RewardConfig;

/// Synthesize `(decision, reward, context)` triples for engine fitting.
pub(crate) fn bootstrap_triples<'a>(
    records: impl IntoIterator<Item = &'a ListingRecord>,
    arms: &[f64],
    encoder: &ContextEncoder,
    reward: &RewardConfig,
    rng: &mut StdRng,
) -> (Vec<f64>, Vec<f64>, Vec<Vec<f64>>) {
    let mut decisions = Vec::new();
    let mut rewards = Vec::new();
    let mut contexts = Vec::new();
    for record in records {
        let tier = arms[rng.random_range(0..arms.len())];
        decisions.push(tier);
        rewards.push(reward.expected_profit(tier, record.base_price, record));
        contexts.push(encoder.transform(record));
    }
    (decisions, rewards, contexts)
}
