//! Listing records: the validated input shape for one pricing decision.
//!
//! Incoming payloads are heterogeneous in practice (different storefronts
//! omit different fields), so every optional field carries a declared default
//! and deserialization never fails on absence. Derived features
//! (market segment, damage total, condition score) are computed here so the
//! encoder and reward model see one consistent view of a device.

use serde::{Deserialize, Serialize};

/// Inventory pressure bucket. Declaration order is the one-hot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum InventoryLevel {
    Low,
    #[default]
    Decent,
    High,
}

impl InventoryLevel {
    pub const ALL: [InventoryLevel; 3] = [
        InventoryLevel::Low,
        InventoryLevel::Decent,
        InventoryLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryLevel::Low => "low",
            InventoryLevel::Decent => "decent",
            InventoryLevel::High => "high",
        }
    }
}

/// Market segment derived from storage capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSegment {
    Budget,
    MidRange,
    HighEnd,
    Premium,
}

impl MarketSegment {
    pub const ALL: [MarketSegment; 4] = [
        MarketSegment::Budget,
        MarketSegment::MidRange,
        MarketSegment::HighEnd,
        MarketSegment::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketSegment::Budget => "budget",
            MarketSegment::MidRange => "mid_range",
            MarketSegment::HighEnd => "high_end",
            MarketSegment::Premium => "premium",
        }
    }
}

fn default_storage() -> f64 {
    128.0
}
fn default_ram() -> f64 {
    4.0
}
fn default_screen_size() -> f64 {
    6.1
}
fn default_camera() -> f64 {
    12.0
}
fn default_battery() -> f64 {
    95.0
}

/// One used-device listing: specs, condition, and market context.
///
/// `base_price` is the model-specific market value looked up by the caller
/// (base-price tables are owned by the serving layer, not this crate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(default)]
    pub model: Option<String>,
    /// Storage in GB.
    #[serde(default = "default_storage")]
    pub storage: f64,
    /// RAM in GB.
    #[serde(default = "default_ram")]
    pub ram: f64,
    /// Screen diagonal in inches.
    #[serde(default = "default_screen_size")]
    pub screen_size: f64,
    /// Main camera resolution in MP.
    #[serde(default = "default_camera")]
    pub camera: f64,
    /// Battery health percentage, 0–100.
    #[serde(default = "default_battery")]
    pub battery: f64,
    /// Screen damage severity in [0, 1] (0 = pristine).
    #[serde(default)]
    pub screen_damage: f64,
    /// Back-glass damage severity in [0, 1].
    #[serde(default)]
    pub backglass_damage: f64,
    /// 1.0 when an external market shock (new release, economic event) is active.
    #[serde(default)]
    pub market_shock: f64,
    #[serde(default)]
    pub inventory_level: InventoryLevel,
    /// Base market price for this model, in the caller's currency.
    pub base_price: f64,
}

impl ListingRecord {
    /// Segment thresholds follow storage capacity: 512+ premium, 256+ high
    /// end, 128+ mid range, below that budget.
    pub fn market_segment(&self) -> MarketSegment {
        if self.storage >= 512.0 {
            MarketSegment::Premium
        } else if self.storage >= 256.0 {
            MarketSegment::HighEnd
        } else if self.storage >= 128.0 {
            MarketSegment::MidRange
        } else {
            MarketSegment::Budget
        }
    }

    /// Combined damage severity (screen + back glass).
    pub fn damage_total(&self) -> f64 {
        self.screen_damage + self.backglass_damage
    }

    /// Composite condition score: battery weighted at 0.4, each undamaged
    /// surface contributing up to 30 points.
    pub fn condition_score(&self) -> f64 {
        self.battery * 0.4
            + (1.0 - self.backglass_damage) * 30.0
            + (1.0 - self.screen_damage) * 30.0
    }

    /// Battery health as a fraction in [0, 1].
    pub fn battery_fraction(&self) -> f64 {
        (self.battery / 100.0).clamp(0.0, 1.0)
    }
}
