//! In-flight decision ledger.
//!
//! Every `recommend` stores what the engine decided and why (context, arm,
//! policy) under a fresh random id; the later `report` consumes that entry
//! atomically. Consuming removes the record, so a duplicate report — an HTTP
//! retry, a double-submitted outcome — fails with `NotFound` instead of
//! double-counting one business outcome into the learning update.
//!
//! The ledger is in-memory and unbounded by design: expiry is a caller
//! policy, exposed as [`DecisionLedger::sweep_older_than`] but never invoked
//! from inside the core.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RecommendError, Result};

/// What was decided for one recommendation, held until its outcome arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision_id: Uuid,
    pub context: Vec<f64>,
    /// The recommended tier multiplier.
    pub arm: f64,
    pub policy_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct DecisionLedger {
    decisions: DashMap<Uuid, DecisionRecord>,
}

impl DecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh decision and return its id (v4 — 128 random bits, so
    /// collision probability is negligible).
    pub fn create(&self, context: Vec<f64>, arm: f64, policy_name: &str) -> Uuid {
        let decision_id = Uuid::new_v4();
        self.decisions.insert(
            decision_id,
            DecisionRecord {
                decision_id,
                context,
                arm,
                policy_name: policy_name.to_string(),
                created_at: Utc::now(),
            },
        );
        decision_id
    }

    /// Atomically remove and return the record. At most one `consume` per id
    /// ever succeeds.
    pub fn consume(&self, decision_id: Uuid) -> Result<DecisionRecord> {
        self.decisions
            .remove(&decision_id)
            .map(|(_, record)| record)
            .ok_or(RecommendError::NotFound(decision_id))
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Drop decisions created before `cutoff`, returning how many were
    /// evicted. Callers that want bounded growth run this on their own
    /// schedule.
    pub fn sweep_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.decisions.len();
        self.decisions.retain(|_, record| record.created_at >= cutoff);
        before - self.decisions.len()
    }
}
