//! Relative Strength Index over simple rolling means.
//!
//! gain = max(delta, 0), loss = max(-delta, 0), both averaged with a plain
//! `period`-bar rolling mean (not Wilder smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period + 1 closes.
//! Edge cases: avg_loss == 0 saturates to 100, including a flat window.

use super::rolling::{diff, rolling_mean};

pub const RSI_PERIOD: usize = 14;

pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let delta = diff(closes);
    let gains: Vec<f64> = delta.iter().map(|d| if d.is_nan() { *d } else { d.max(0.0) }).collect();
    let losses: Vec<f64> = delta
        .iter()
        .map(|d| if d.is_nan() { *d } else { (-d).max(0.0) })
        .collect();

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| rsi_value(g, l))
        .collect()
}

/// A window with zero average loss reads 100, flat 0/0 windows included, so such rows
/// are kept rather than dropped as NaN.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_is_nan() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let out = rsi(&closes, RSI_PERIOD);
        assert!(out[..RSI_PERIOD].iter().all(|v| v.is_nan()));
        assert!(out[RSI_PERIOD].is_finite());
    }

    #[test]
    fn only_gains_saturates() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&closes, RSI_PERIOD)[19], 100.0);
    }

    #[test]
    fn flat_series_saturates_instead_of_nan() {
        let out = rsi(&[50.0; 20], RSI_PERIOD);
        assert_eq!(out[19], 100.0);
    }

    #[test]
    fn only_losses_is_zero() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_eq!(rsi(&closes, RSI_PERIOD)[19], 0.0);
    }

    #[test]
    fn balanced_moves_give_fifty() {
        let closes: Vec<f64> = (0..16).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
        let out = rsi(&closes, 14);
        assert!((out[15] - 50.0).abs() < 1e-9);
    }
}
