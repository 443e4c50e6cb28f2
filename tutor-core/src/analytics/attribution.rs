//! Winning vs losing trades and the features they were entered on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Trade, FEATURE_COLUMNS};

/// Winners have `pnl > 0`; everything else is a loser.
pub fn split_trades(trades: &[Trade]) -> (Vec<&Trade>, Vec<&Trade>) {
    trades.iter().partition(|t| t.is_winner())
}

/// Per-feature mean of the entry snapshots. Empty map for no trades.
pub fn average_features(trades: &[&Trade]) -> BTreeMap<String, f64> {
    if trades.is_empty() {
        return BTreeMap::new();
    }
    let n = trades.len() as f64;
    let mut sums = [0.0; FEATURE_COLUMNS.len()];
    for trade in trades {
        for (sum, v) in sums.iter_mut().zip(trade.feature_snapshot.values()) {
            *sum += v;
        }
    }
    FEATURE_COLUMNS
        .iter()
        .zip(sums)
        .map(|(name, sum)| (name.to_string(), sum / n))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureComparison {
    pub winning: f64,
    pub losing: f64,
}

/// Mean entry features of winners next to losers, keyed by the winners' features.
///
/// No winners gives an empty map; no losers reports `losing = 0.0`.
pub fn feature_comparison(trades: &[Trade]) -> BTreeMap<String, FeatureComparison> {
    let (winners, losers) = split_trades(trades);
    let win_avg = average_features(&winners);
    let lose_avg = average_features(&losers);
    win_avg
        .into_iter()
        .map(|(name, winning)| {
            let losing = lose_avg.get(&name).copied().unwrap_or(0.0);
            (name, FeatureComparison { winning, losing })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature_vector::sample_features;
    use chrono::NaiveDate;

    fn trade(pnl: f64, rsi: f64) -> Trade {
        let mut features = sample_features();
        features.rsi = rsi;
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        Trade {
            entry_date: date,
            exit_date: date + chrono::Duration::days(5),
            entry_price: 100.0,
            exit_price: 100.0 * (1.0 + pnl),
            pnl,
            position_size: 1.0,
            entry_probability: 0.7,
            feature_snapshot: features,
        }
    }

    #[test]
    fn zero_pnl_is_a_loss() {
        let trades = vec![trade(0.02, 60.0), trade(0.0, 40.0), trade(-0.01, 30.0)];
        let (winners, losers) = split_trades(&trades);
        assert_eq!(winners.len(), 1);
        assert_eq!(losers.len(), 2);
    }

    #[test]
    fn averages_per_feature() {
        let trades = [trade(-0.01, 40.0), trade(-0.02, 30.0)];
        let refs: Vec<&Trade> = trades.iter().collect();
        let avg = average_features(&refs);
        assert_eq!(avg.len(), FEATURE_COLUMNS.len());
        assert_eq!(avg["rsi"], 35.0);
        assert!(average_features(&[]).is_empty());
    }

    #[test]
    fn comparison_fills_missing_losers_with_zero() {
        let cmp = feature_comparison(&[trade(0.05, 70.0)]);
        assert_eq!(cmp["rsi"], FeatureComparison { winning: 70.0, losing: 0.0 });
    }

    #[test]
    fn comparison_without_winners_is_empty() {
        assert!(feature_comparison(&[trade(-0.05, 70.0)]).is_empty());
    }

    #[test]
    fn comparison_both_sides() {
        let cmp = feature_comparison(&[trade(0.05, 70.0), trade(-0.05, 30.0)]);
        assert_eq!(cmp["rsi"].winning, 70.0);
        assert_eq!(cmp["rsi"].losing, 30.0);
    }
}
