//! Context encoding: listing record → fixed-length numeric vector.
//!
//! Layout is one one-hot block per categorical field (values enumerated at
//! fit time, in declared order) followed by the numeric fields in declared
//! order. A categorical value unseen at fit time maps to the all-zero
//! sub-vector — the vector never grows and `transform` never fails, so every
//! context handed to an engine has exactly the dimension its policy was
//! fitted with. The scaling mode is part of the fitted state and is applied
//! identically at serving time.

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};
use crate::record::ListingRecord;

/// Categorical inputs the encoder knows how to one-hot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    InventoryLevel,
    MarketSegment,
}

/// Numeric inputs, encoded in declared order. The last two are derived
/// features rather than raw payload fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Storage,
    Ram,
    ScreenSize,
    Camera,
    Battery,
    MarketShock,
    ScreenDamage,
    BackglassDamage,
    DamageTotal,
    ConditionScore,
}

impl CategoricalField {
    fn value_of(&self, record: &ListingRecord) -> &'static str {
        match self {
            CategoricalField::InventoryLevel => record.inventory_level.as_str(),
            CategoricalField::MarketSegment => record.market_segment().as_str(),
        }
    }

    /// All representable values, in declared (one-hot) order.
    fn universe(&self) -> Vec<&'static str> {
        match self {
            CategoricalField::InventoryLevel => crate::record::InventoryLevel::ALL
                .iter()
                .map(|v| v.as_str())
                .collect(),
            CategoricalField::MarketSegment => crate::record::MarketSegment::ALL
                .iter()
                .map(|v| v.as_str())
                .collect(),
        }
    }
}

impl NumericField {
    fn value_of(&self, record: &ListingRecord) -> f64 {
        match self {
            NumericField::Storage => record.storage,
            NumericField::Ram => record.ram,
            NumericField::ScreenSize => record.screen_size,
            NumericField::Camera => record.camera,
            NumericField::Battery => record.battery,
            NumericField::MarketShock => record.market_shock,
            NumericField::ScreenDamage => record.screen_damage,
            NumericField::BackglassDamage => record.backglass_damage,
            NumericField::DamageTotal => record.damage_total(),
            NumericField::ConditionScore => record.condition_score(),
        }
    }
}

/// How numeric fields are scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum ScalingMode {
    /// Values pass through unscaled.
    #[default]
    Identity,
    /// Fitted affine standardization: subtract mean, divide by std.
    Standardize,
}

/// Floor applied to fitted standard deviations so constant columns do not
/// divide by zero.
const STD_FLOOR: f64 = 1e-8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub categorical: Vec<CategoricalField>,
    pub numeric: Vec<NumericField>,
    pub scaling: ScalingMode,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            categorical: vec![
                CategoricalField::InventoryLevel,
                CategoricalField::MarketSegment,
            ],
            numeric: vec![
                NumericField::Storage,
                NumericField::Ram,
                NumericField::ScreenSize,
                NumericField::Camera,
                NumericField::Battery,
                NumericField::MarketShock,
                NumericField::ScreenDamage,
                NumericField::BackglassDamage,
                NumericField::DamageTotal,
                NumericField::ConditionScore,
            ],
            scaling: ScalingMode::Identity,
        }
    }
}

/// Fitted encoder state. Category tables and scaling parameters are fixed at
/// fit time; `dim()` never changes for the encoder's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEncoder {
    config: EncoderConfig,
    /// Distinct values seen at fit time, one table per categorical field,
    /// each in declared order.
    categories: Vec<Vec<String>>,
    /// `(mean, std)` per numeric field when standardizing.
    standardization: Option<Vec<(f64, f64)>>,
    dim: usize,
}

impl ContextEncoder {
    /// Fit the encoder on a training set.
    ///
    /// Fails with a configuration error when either field list or the
    /// training set is empty.
    pub fn fit(records: &[ListingRecord], config: EncoderConfig) -> Result<Self> {
        if config.categorical.is_empty() {
            return Err(RecommendError::Config(
                "at least one categorical field is required".into(),
            ));
        }
        if config.numeric.is_empty() {
            return Err(RecommendError::Config(
                "at least one numeric field is required".into(),
            ));
        }
        if records.is_empty() {
            return Err(RecommendError::Config("training set is empty".into()));
        }

        let mut categories = Vec::with_capacity(config.categorical.len());
        for field in &config.categorical {
            // Declared order, filtered to values actually present at fit time.
            let seen: Vec<String> = field
                .universe()
                .into_iter()
                .filter(|v| records.iter().any(|r| field.value_of(r) == *v))
                .map(str::to_string)
                .collect();
            categories.push(seen);
        }

        let standardization = match config.scaling {
            ScalingMode::Identity => None,
            ScalingMode::Standardize => {
                let n = records.len() as f64;
                let params = config
                    .numeric
                    .iter()
                    .map(|field| {
                        let mean =
                            records.iter().map(|r| field.value_of(r)).sum::<f64>() / n;
                        let var = records
                            .iter()
                            .map(|r| {
                                let d = field.value_of(r) - mean;
                                d * d
                            })
                            .sum::<f64>()
                            / n;
                        (mean, var.sqrt().max(STD_FLOOR))
                    })
                    .collect();
                Some(params)
            }
        };

        let dim =
            categories.iter().map(Vec::len).sum::<usize>() + config.numeric.len();
        Ok(Self {
            config,
            categories,
            standardization,
            dim,
        })
    }

    /// Fixed context-vector length.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn scaling(&self) -> ScalingMode {
        self.config.scaling
    }

    /// Encode one record. Infallible: unseen categorical values produce an
    /// all-zero one-hot block and non-finite numerics are zeroed.
    pub fn transform(&self, record: &ListingRecord) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.dim);
        for (field, table) in self.config.categorical.iter().zip(&self.categories) {
            let value = field.value_of(record);
            for known in table {
                out.push(if known == value { 1.0 } else { 0.0 });
            }
        }
        for (i, field) in self.config.numeric.iter().enumerate() {
            let raw = field.value_of(record);
            let raw = if raw.is_finite() { raw } else { 0.0 };
            let scaled = match &self.standardization {
                None => raw,
                Some(params) => {
                    let (mean, std) = params[i];
                    (raw - mean) / std
                }
            };
            out.push(scaled);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(inventory: &str, storage: f64, battery: f64) -> ListingRecord {
        // Build via serde for the categorical/base-price fields, then set the
        // numeric fields directly: `f64::NAN` has no valid JSON text form, so
        // routing it through `serde_json` would fail to parse.
        let mut r: ListingRecord = serde_json::from_str(&format!(
            r#"{{"base_price": 50000.0, "inventory_level": "{inventory}"}}"#
        ))
        .unwrap();
        r.storage = storage;
        r.battery = battery;
        r
    }

    fn minimal_config() -> EncoderConfig {
        EncoderConfig {
            categorical: vec![CategoricalField::InventoryLevel],
            numeric: vec![NumericField::Storage, NumericField::Battery],
            scaling: ScalingMode::Identity,
        }
    }

    #[test]
    fn one_hot_block_then_numeric_block() {
        let train = vec![
            record("low", 64.0, 80.0),
            record("decent", 128.0, 90.0),
            record("high", 256.0, 100.0),
        ];
        let enc = ContextEncoder::fit(&train, minimal_config()).unwrap();
        assert_eq!(enc.dim(), 5);

        let x = enc.transform(&record("low", 256.0, 90.0));
        assert_eq!(x, vec![1.0, 0.0, 0.0, 256.0, 90.0]);
    }

    #[test]
    fn unseen_category_maps_to_zero_block() {
        // Only "low" and "decent" appear at fit time.
        let train = vec![record("low", 64.0, 80.0), record("decent", 128.0, 90.0)];
        let enc = ContextEncoder::fit(&train, minimal_config()).unwrap();
        assert_eq!(enc.dim(), 4);

        let x = enc.transform(&record("high", 64.0, 80.0));
        assert_eq!(&x[..2], &[0.0, 0.0]);
        assert_eq!(x.len(), enc.dim());
    }

    #[test]
    fn standardize_is_recorded_and_applied() {
        let train = vec![record("low", 100.0, 80.0), record("low", 300.0, 80.0)];
        let cfg = EncoderConfig {
            scaling: ScalingMode::Standardize,
            ..minimal_config()
        };
        let enc = ContextEncoder::fit(&train, cfg).unwrap();
        assert_eq!(enc.scaling(), ScalingMode::Standardize);

        // Storage: mean 200, std 100 → 300 encodes to +1.
        let x = enc.transform(&record("low", 300.0, 80.0));
        assert!((x[1] - 1.0).abs() < 1e-9, "x={x:?}");
        // Battery is constant; the std floor keeps the value finite.
        assert!(x[2].is_finite());
    }

    #[test]
    fn fit_rejects_empty_inputs() {
        let train = vec![record("low", 64.0, 80.0)];
        let no_cats = EncoderConfig {
            categorical: vec![],
            ..minimal_config()
        };
        assert!(matches!(
            ContextEncoder::fit(&train, no_cats),
            Err(RecommendError::Config(_))
        ));

        let no_nums = EncoderConfig {
            numeric: vec![],
            ..minimal_config()
        };
        assert!(matches!(
            ContextEncoder::fit(&train, no_nums),
            Err(RecommendError::Config(_))
        ));

        assert!(matches!(
            ContextEncoder::fit(&[], minimal_config()),
            Err(RecommendError::Config(_))
        ));
    }

    #[test]
    fn dimension_is_stable_across_transforms() {
        let train = vec![record("low", 64.0, 80.0), record("high", 512.0, 100.0)];
        let enc = ContextEncoder::fit(&train, EncoderConfig::default()).unwrap();
        let d = enc.dim();
        for r in &[
            record("decent", 1024.0, 50.0),
            record("low", 0.0, 0.0),
            record("high", f64::NAN, 95.0),
        ] {
            assert_eq!(enc.transform(r).len(), d);
        }
    }
}
