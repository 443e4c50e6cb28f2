//! A completed, immutable round trip.

use super::feature_vector::FeatureVector;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A closed long position: entry → exit.
///
/// `pnl` is the fractional price return of the round trip
/// (`exit_price / entry_price - 1`), independent of `position_size`.
/// The feature snapshot is the one taken at entry and is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub position_size: f64,
    #[serde(rename = "bullish_prob")]
    pub entry_probability: f64,
    #[serde(rename = "features")]
    pub feature_snapshot: FeatureVector,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// Calendar days between entry and exit.
    pub fn days_held(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }

    /// Capital multiplier applied when this trade closed.
    pub fn capital_factor(&self) -> f64 {
        1.0 + self.position_size * self.pnl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature_vector::sample_features;

    fn sample_trade() -> Trade {
        Trade {
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            entry_price: 100.0,
            exit_price: 110.0,
            pnl: 110.0 / 100.0 - 1.0,
            position_size: 0.3,
            entry_probability: 0.7,
            feature_snapshot: sample_features(),
        }
    }

    #[test]
    fn winner_and_duration() {
        let trade = sample_trade();
        assert!(trade.is_winner());
        assert_eq!(trade.days_held(), 6);
    }

    #[test]
    fn capital_factor_scales_with_size() {
        let trade = sample_trade();
        assert!((trade.capital_factor() - 1.03).abs() < 1e-12);
    }

    #[test]
    fn serializes_with_report_field_names() {
        let json = serde_json::to_value(sample_trade()).unwrap();
        assert_eq!(json["entry_date"], "2024-01-05");
        assert_eq!(json["bullish_prob"], 0.7);
        assert_eq!(json["features"]["rsi"], 61.0);
        assert!(json.get("entry_probability").is_none());
    }

    #[test]
    fn zero_pnl_is_a_loss() {
        let mut trade = sample_trade();
        trade.exit_price = 100.0;
        trade.pnl = 0.0;
        assert!(!trade.is_winner());
    }
}
