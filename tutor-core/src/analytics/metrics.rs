//! Return, drawdown and Sharpe ratio of an equity curve.
//!
//! All functions take capital values in date order. Degenerate inputs give
//! defined values (`0.0` or `None`), never `NaN`.

use serde::{Deserialize, Serialize};

use crate::domain::{capital_values, EquityPoint, Trade};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// `last / first - 1`. Zero for fewer than two points.
pub fn total_return(equity: &[f64]) -> f64 {
    match (equity.first(), equity.last()) {
        (Some(first), Some(last)) if equity.len() >= 2 => last / first - 1.0,
        _ => 0.0,
    }
}

/// Fractional distance below the running peak, per point. Always `<= 0`.
pub fn drawdown(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            ((value - peak) / peak).min(0.0)
        })
        .collect()
}

/// Minimum of [`drawdown`]; zero for an empty curve.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    drawdown(equity).into_iter().fold(0.0, f64::min)
}

/// Daily fractional changes, one shorter than the input.
pub fn daily_returns(equity: &[f64]) -> Vec<f64> {
    equity.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Annualized Sharpe ratio of daily returns in excess of `risk_free / 252`.
///
/// `None` when there are fewer than two returns or the returns do not vary.
pub fn sharpe(equity: &[f64], risk_free: f64) -> Option<f64> {
    let daily_rf = risk_free / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = daily_returns(equity)
        .into_iter()
        .map(|r| r - daily_rf)
        .collect();
    if excess.len() < 2 || excess.iter().any(|r| !r.is_finite()) {
        return None;
    }

    let n = excess.len() as f64;
    let mean = excess.iter().sum::<f64>() / n;
    let var = excess.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    if std < 1e-15 {
        return None;
    }
    Some(TRADING_DAYS_PER_YEAR.sqrt() * mean / std)
}

/// Headline numbers for one equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    pub total_return: f64,
    pub max_drawdown: f64,
    /// `null` when undefined.
    pub sharpe_ratio: Option<f64>,
    pub num_trades: usize,
}

impl MetricsBundle {
    pub fn compute(curve: &[EquityPoint], trades: &[Trade]) -> Self {
        let equity = capital_values(curve);
        Self {
            total_return: total_return(&equity),
            max_drawdown: max_drawdown(&equity),
            sharpe_ratio: sharpe(&equity, 0.0),
            num_trades: trades.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_return_basic() {
        assert!((total_return(&[10_000.0, 11_000.0]) - 0.1).abs() < 1e-12);
        assert_eq!(total_return(&[10_000.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let dd = drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[2] + 0.25).abs() < 1e-12);
        assert_eq!(dd[3], 0.0);
        assert!((dd[4] + 0.1).abs() < 1e-12);
        assert!((max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]) + 0.25).abs() < 1e-12);
    }

    #[test]
    fn monotonic_curve_has_no_drawdown() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn sharpe_undefined_for_flat_or_short_curves() {
        assert_eq!(sharpe(&[10_000.0; 50], 0.0), None);
        assert_eq!(sharpe(&[100.0, 101.0], 0.0), None);
        assert_eq!(sharpe(&[], 0.0), None);
    }

    #[test]
    fn sharpe_matches_hand_computation() {
        // returns: +10%, -5%, +5%
        let equity = [100.0, 110.0, 104.5, 109.725];
        let r = [0.1, -0.05, 0.05];
        let mean = r.iter().sum::<f64>() / 3.0;
        let std = (r.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 2.0).sqrt();
        let expected = 252f64.sqrt() * mean / std;
        assert!((sharpe(&equity, 0.0).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn risk_free_lowers_sharpe() {
        let equity = [100.0, 110.0, 104.5, 109.725];
        assert!(sharpe(&equity, 0.05).unwrap() < sharpe(&equity, 0.0).unwrap());
    }
}
