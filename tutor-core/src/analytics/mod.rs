//! PerformanceAnalytics: metrics over equity curves and trade ledgers.

pub mod attribution;
pub mod drawdown;
pub mod metrics;

pub use attribution::{average_features, feature_comparison, split_trades, FeatureComparison};
pub use drawdown::{max_drawdown_window, trades_during_period, DrawdownWindow};
pub use metrics::{daily_returns, drawdown, max_drawdown, sharpe, total_return, MetricsBundle};

use crate::domain::EquityPoint;
use crate::engine::SimulationBar;

/// Capital of a fully invested, never-traded position: `close / close_0 * capital`.
pub fn buy_and_hold_curve(bars: &[SimulationBar], initial_capital: f64) -> Vec<EquityPoint> {
    let Some(first) = bars.first() else {
        return Vec::new();
    };
    bars.iter()
        .map(|b| EquityPoint {
            date: b.date,
            capital: b.close / first.close * initial_capital,
        })
        .collect()
}

