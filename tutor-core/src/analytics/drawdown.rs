//! Locating the maximum-drawdown window and the trades opened inside it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::drawdown;
use crate::domain::{capital_values, EquityPoint, Trade};

/// Peak-to-trough window of the deepest drawdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownWindow {
    pub peak_date: NaiveDate,
    pub trough_date: NaiveDate,
    pub drawdown: f64,
    /// Trades whose entry date falls within `[peak_date, trough_date]`.
    pub trades_in_window: Vec<Trade>,
}

/// Trough is the first date of minimum drawdown; peak is the first date of
/// maximum equity at or before the trough. `None` for an empty curve.
pub fn max_drawdown_window(curve: &[EquityPoint], trades: &[Trade]) -> Option<DrawdownWindow> {
    let equity = capital_values(curve);
    let dd = drawdown(&equity);

    let trough = first_index_by(&dd, |candidate, best| candidate < best)?;
    let peak = first_index_by(&equity[..=trough], |candidate, best| candidate > best)?;

    let peak_date = curve[peak].date;
    let trough_date = curve[trough].date;
    Some(DrawdownWindow {
        peak_date,
        trough_date,
        drawdown: dd[trough],
        trades_in_window: trades_during_period(trades, peak_date, trough_date),
    })
}

/// Index of the first element that no later element beats.
fn first_index_by(values: &[f64], beats: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some(b) if !beats(v, values[b]) => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Trades with `start <= entry_date <= end`, in ledger order.
pub fn trades_during_period(trades: &[Trade], start: NaiveDate, end: NaiveDate) -> Vec<Trade> {
    trades
        .iter()
        .filter(|t| start <= t.entry_date && t.entry_date <= end)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature_vector::sample_features;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &capital)| EquityPoint {
                date: d(i as u32 + 1),
                capital,
            })
            .collect()
    }

    fn trade(entry: u32) -> Trade {
        Trade {
            entry_date: d(entry),
            exit_date: d(entry + 1),
            entry_price: 100.0,
            exit_price: 95.0,
            pnl: -0.05,
            position_size: 1.0,
            entry_probability: 0.6,
            feature_snapshot: sample_features(),
        }
    }

    #[test]
    fn window_spans_peak_to_trough() {
        let c = curve(&[100.0, 120.0, 110.0, 90.0, 95.0, 130.0]);
        let trades = vec![trade(1), trade(2), trade(4), trade(5)];
        let w = max_drawdown_window(&c, &trades).unwrap();
        assert_eq!(w.peak_date, d(2));
        assert_eq!(w.trough_date, d(4));
        assert!((w.drawdown + 0.25).abs() < 1e-12);
        let entries: Vec<_> = w.trades_in_window.iter().map(|t| t.entry_date).collect();
        assert_eq!(entries, vec![d(2), d(4)]);
    }

    #[test]
    fn flat_curve_collapses_to_first_date() {
        let w = max_drawdown_window(&curve(&[5.0, 5.0, 5.0]), &[]).unwrap();
        assert_eq!(w.peak_date, d(1));
        assert_eq!(w.trough_date, d(1));
        assert_eq!(w.drawdown, 0.0);
    }

    #[test]
    fn ties_pick_earliest() {
        let w = max_drawdown_window(&curve(&[100.0, 100.0, 50.0, 100.0, 50.0]), &[]).unwrap();
        assert_eq!(w.peak_date, d(1));
        assert_eq!(w.trough_date, d(3));
    }

    #[test]
    fn empty_curve_has_no_window() {
        assert!(max_drawdown_window(&[], &[]).is_none());
    }
}
