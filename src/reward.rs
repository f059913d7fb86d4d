//! Deterministic expected-profit model.
//!
//! Used to price bootstrap training triples and to compute realized/oracle
//! rewards during offline evaluation. Live serving never calls this — there
//! the reward arrives from the outside world via `report`.
//!
//! The model composes a per-tier base sale probability with condition,
//! inventory-pressure and market-shock multipliers, clamps the probability
//! into a fixed band, and converts it to expected profit minus a holding
//! cost on the unsold fraction. Every factor is an independently tunable
//! scalar; nothing here draws randomness.

use serde::{Deserialize, Serialize};

use crate::record::{InventoryLevel, ListingRecord};

/// Per-tier demand and margin parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierParams {
    pub multiplier: f64,
    /// Base probability of a sale at this tier, before condition/market
    /// adjustments.
    pub sale_probability: f64,
    /// Profit margin as a fraction of the selling price.
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub tiers: Vec<TierParams>,
    /// Fallbacks for a tier not declared above.
    pub default_sale_probability: f64,
    pub default_margin: f64,
    /// Sale-probability penalty per unit of combined damage severity.
    pub damage_penalty: f64,
    /// Pressure to move excess stock raises the chance of a sale.
    pub high_inventory_multiplier: f64,
    /// Scarce stock means less pressure to sell.
    pub low_inventory_multiplier: f64,
    pub market_shock_multiplier: f64,
    /// Holding cost per period as a fraction of base price, charged on the
    /// unsold probability mass.
    pub holding_cost_rate: f64,
    /// Clamp band keeping sale probability away from degenerate 0/1.
    pub probability_floor: f64,
    pub probability_ceiling: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                TierParams {
                    multiplier: 0.9,
                    sale_probability: 0.90,
                    margin: 0.15,
                },
                TierParams {
                    multiplier: 1.0,
                    sale_probability: 0.70,
                    margin: 0.25,
                },
                TierParams {
                    multiplier: 1.1,
                    sale_probability: 0.50,
                    margin: 0.35,
                },
            ],
            default_sale_probability: 0.70,
            default_margin: 0.25,
            damage_penalty: 0.2,
            high_inventory_multiplier: 1.1,
            low_inventory_multiplier: 0.9,
            market_shock_multiplier: 0.85,
            holding_cost_rate: 0.01,
            probability_floor: 0.05,
            probability_ceiling: 0.95,
        }
    }
}

impl RewardConfig {
    fn tier_params(&self, tier: f64) -> (f64, f64) {
        self.tiers
            .iter()
            .find(|t| t.multiplier.to_bits() == tier.to_bits())
            .map(|t| (t.sale_probability, t.margin))
            .unwrap_or((self.default_sale_probability, self.default_margin))
    }

    /// Probability that a device in this condition sells at this tier,
    /// clamped into `[floor, ceiling]`.
    pub fn sale_probability(&self, tier: f64, record: &ListingRecord) -> f64 {
        let (base, _) = self.tier_params(tier);
        let condition =
            record.battery_fraction() * (1.0 - record.damage_total() * self.damage_penalty);
        let inventory = match record.inventory_level {
            InventoryLevel::High => self.high_inventory_multiplier,
            InventoryLevel::Low => self.low_inventory_multiplier,
            InventoryLevel::Decent => 1.0,
        };
        let shock = if record.market_shock > 0.0 {
            self.market_shock_multiplier
        } else {
            1.0
        };
        (base * condition * inventory * shock)
            .clamp(self.probability_floor, self.probability_ceiling)
    }

    /// Expected profit of listing at `tier`:
    /// `p·base_price·tier·margin − base_price·holding_rate·(1−p)`.
    pub fn expected_profit(&self, tier: f64, base_price: f64, record: &ListingRecord) -> f64 {
        let (_, margin) = self.tier_params(tier);
        let p = self.sale_probability(tier, record);
        let expected = p * base_price * tier * margin;
        let holding = base_price * self.holding_cost_rate * (1.0 - p);
        expected - holding
    }

    /// Best achievable expected profit over the declared arms — the oracle
    /// term in regret accounting.
    pub fn oracle_profit(&self, arms: &[f64], base_price: f64, record: &ListingRecord) -> f64 {
        arms.iter()
            .map(|&tier| self.expected_profit(tier, base_price, record))
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> ListingRecord {
        serde_json::from_str(json).unwrap()
    }

    fn pristine() -> ListingRecord {
        record(r#"{"base_price": 100000.0, "battery": 100.0}"#)
    }

    #[test]
    fn reward_is_deterministic() {
        let cfg = RewardConfig::default();
        let r = pristine();
        let a = cfg.expected_profit(1.0, r.base_price, &r);
        let b = cfg.expected_profit(1.0, r.base_price, &r);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn discount_tier_sells_more_often_than_premium() {
        let cfg = RewardConfig::default();
        let r = pristine();
        assert!(cfg.sale_probability(0.9, &r) > cfg.sale_probability(1.1, &r));
    }

    #[test]
    fn probability_is_clamped_into_the_band() {
        let cfg = RewardConfig::default();
        // Wrecked device: heavy damage and dead battery would push the raw
        // probability to zero.
        let wreck = record(
            r#"{"base_price": 1000.0, "battery": 1.0,
                "screen_damage": 1.0, "backglass_damage": 1.0}"#,
        );
        for tier in [0.9, 1.0, 1.1] {
            let p = cfg.sale_probability(tier, &wreck);
            assert!((cfg.probability_floor..=cfg.probability_ceiling).contains(&p));
        }
    }

    #[test]
    fn damage_lowers_expected_profit() {
        let cfg = RewardConfig::default();
        let clean = pristine();
        let cracked = record(
            r#"{"base_price": 100000.0, "battery": 100.0, "screen_damage": 1.0}"#,
        );
        assert!(
            cfg.expected_profit(1.0, 100000.0, &clean)
                > cfg.expected_profit(1.0, 100000.0, &cracked)
        );
    }

    #[test]
    fn inventory_and_shock_multipliers_apply() {
        let cfg = RewardConfig::default();
        let base = pristine();
        let high = record(
            r#"{"base_price": 100000.0, "battery": 100.0, "inventory_level": "high"}"#,
        );
        let shocked = record(
            r#"{"base_price": 100000.0, "battery": 100.0, "market_shock": 1.0}"#,
        );
        assert!(cfg.sale_probability(1.0, &high) > cfg.sale_probability(1.0, &base));
        assert!(cfg.sale_probability(1.0, &shocked) < cfg.sale_probability(1.0, &base));
    }

    #[test]
    fn oracle_dominates_every_arm() {
        let cfg = RewardConfig::default();
        let arms = [0.9, 1.0, 1.1];
        let r = record(r#"{"base_price": 80000.0, "battery": 85.0, "screen_damage": 0.5}"#);
        let oracle = cfg.oracle_profit(&arms, r.base_price, &r);
        for tier in arms {
            assert!(oracle >= cfg.expected_profit(tier, r.base_price, &r));
        }
    }

    #[test]
    fn undeclared_tier_uses_fallback_params() {
        let cfg = RewardConfig::default();
        let r = pristine();
        let p = cfg.sale_probability(1.05, &r);
        let expect = (cfg.default_sale_probability * r.battery_fraction())
            .clamp(cfg.probability_floor, cfg.probability_ceiling);
        assert!((p - expect).abs() < 1e-12);
    }
}
