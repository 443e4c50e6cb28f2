//! The named point-in-time features of one bar.
//!
//! The field order here is the canonical column order used for model
//! training, feature snapshots and reporting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical feature column names, in model input order.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "return_5d",
    "return_20d",
    "ma_ratio",
    "trend_slope_20d",
    "rsi",
    "atr",
    "volatility_20d",
    "regime_stress",
    "relative_strength_spy",
];

/// Number of model input features.
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Features computed from a rolling window ending at (and including) one date.
///
/// `atr` is the 14-bar rolling standard deviation of close, not a true
/// average true range; the name is kept for compatibility with stored reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub return_5d: f64,
    pub return_20d: f64,
    pub ma_ratio: f64,
    pub trend_slope_20d: f64,
    pub rsi: f64,
    pub atr: f64,
    pub volatility_20d: f64,
    pub regime_stress: bool,
    pub relative_strength_spy: f64,
}

impl FeatureVector {
    /// Feature values as model inputs, in `FEATURE_COLUMNS` order.
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.return_5d,
            self.return_20d,
            self.ma_ratio,
            self.trend_slope_20d,
            self.rsi,
            self.atr,
            self.volatility_20d,
            if self.regime_stress { 1.0 } else { 0.0 },
            self.relative_strength_spy,
        ]
    }

    /// Name → value map with deterministic key order.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        FEATURE_COLUMNS
            .iter()
            .zip(self.values())
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// Look up a single feature by column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == name)
            .map(|i| self.values()[i])
    }

    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
pub(crate) fn sample_features() -> FeatureVector {
    FeatureVector {
        return_5d: 0.01,
        return_20d: 0.03,
        ma_ratio: 1.02,
        trend_slope_20d: 0.004,
        rsi: 61.0,
        atr: 2.5,
        volatility_20d: 0.012,
        regime_stress: false,
        relative_strength_spy: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_follow_column_order() {
        let mut fv = sample_features();
        fv.regime_stress = true;
        let values = fv.values();
        assert_eq!(values[0], 0.01);
        assert_eq!(values[4], 61.0);
        assert_eq!(values[7], 1.0);
    }

    #[test]
    fn map_keys_are_sorted_and_complete() {
        let map = sample_features().to_map();
        assert_eq!(map.len(), FEATURE_COUNT);
        let keys: Vec<&String> = map.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(map["rsi"], 61.0);
    }

    #[test]
    fn get_by_name() {
        let fv = sample_features();
        assert_eq!(fv.get("atr"), Some(2.5));
        assert_eq!(fv.get("regime_stress"), Some(0.0));
        assert_eq!(fv.get("unknown"), None);
    }
}
