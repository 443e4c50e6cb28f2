//! Forward-looking training targets.
//!
//! Labels read bars after the current one. They are attached to rows for model
//! fitting and never reach the engine.

use serde::{Deserialize, Serialize};

use super::rolling::{pct_change, quantile, rolling_std, shift};

/// Tertile of forward volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityBucket {
    Low,
    Medium,
    High,
}

/// Targets for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetLabels {
    pub future_return: f64,
    pub target_trend: bool,
    pub future_volatility: f64,
    pub target_volatility: VolatilityBucket,
}

pub(crate) struct LabelColumns {
    pub future_return: Vec<f64>,
    pub future_volatility: Vec<f64>,
    pub target_volatility: Vec<Option<VolatilityBucket>>,
}

impl LabelColumns {
    pub fn compute(closes: &[f64], horizon: usize) -> Self {
        let h = horizon as isize;
        let ahead = shift(closes, -h);
        let future_return = closes
            .iter()
            .zip(&ahead)
            .map(|(now, later)| later / now - 1.0)
            .collect();

        // std of the `horizon` daily returns strictly after each bar
        let future_volatility = shift(&rolling_std(&pct_change(closes, 1), horizon), -h);
        let target_volatility = tercile_buckets(&future_volatility);

        Self {
            future_return,
            future_volatility,
            target_volatility,
        }
    }

    pub fn row(&self, i: usize) -> Option<TargetLabels> {
        let future_return = self.future_return[i];
        let future_volatility = self.future_volatility[i];
        if !future_return.is_finite() || !future_volatility.is_finite() {
            return None;
        }
        Some(TargetLabels {
            future_return,
            target_trend: future_return > 0.0,
            future_volatility,
            target_volatility: self.target_volatility[i]?,
        })
    }
}

/// Equal-frequency buckets with edges at the 0, 1/3, 2/3 and 1 quantiles of the
/// whole column. Values on an edge go to the lower bucket, so duplicate edges
/// collapse into the lower bucket.
pub fn tercile_buckets(values: &[f64]) -> Vec<Option<VolatilityBucket>> {
    let (Some(low_edge), Some(high_edge)) =
        (quantile(values, 1.0 / 3.0), quantile(values, 2.0 / 3.0))
    else {
        return vec![None; values.len()];
    };

    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                None
            } else if v <= low_edge {
                Some(VolatilityBucket::Low)
            } else if v <= high_edge {
                Some(VolatilityBucket::Medium)
            } else {
                Some(VolatilityBucket::High)
            }
        })
        .collect()
}
