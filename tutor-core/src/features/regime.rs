//! Volatility regime stress flag.
//!
//! A bar is "stressed" when its 20-day volatility is strictly above the 70th
//! percentile of volatility. Where that percentile comes from is the
//! [`RegimeThreshold`] policy.

use serde::{Deserialize, Serialize};

use super::rolling::quantile;

pub const STRESS_QUANTILE: f64 = 0.7;

/// Source of the stress threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RegimeThreshold {
    /// One threshold over the whole series. Each bar's flag depends on
    /// volatility observed after that bar.
    #[default]
    FullSeries,
    /// Threshold from at most `window` trailing observations ending at the bar.
    Trailing { window: usize },
}

pub fn stress_flags(volatility: &[f64], policy: RegimeThreshold) -> Vec<bool> {
    match policy {
        RegimeThreshold::FullSeries => full_series_stress_flags(volatility, STRESS_QUANTILE),
        RegimeThreshold::Trailing { window } => {
            trailing_stress_flags(volatility, STRESS_QUANTILE, window)
        }
    }
}

/// Flags against a quantile of the entire series, future bars included.
///
/// This is a look-ahead: truncating the series can flip earlier flags.
pub fn full_series_stress_flags(volatility: &[f64], q: f64) -> Vec<bool> {
    match quantile(volatility, q) {
        Some(threshold) => volatility.iter().map(|v| *v > threshold).collect(),
        None => vec![false; volatility.len()],
    }
}

/// Flags against a quantile of the trailing `window` values up to and including each bar.
pub fn trailing_stress_flags(volatility: &[f64], q: f64, window: usize) -> Vec<bool> {
    let window = window.max(1);
    (0..volatility.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            match quantile(&volatility[start..=i], q) {
                Some(threshold) => volatility[i] > threshold,
                None => false,
            }
        })
        .collect()
}
