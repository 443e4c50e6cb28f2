//! Several profiles over one dataset.
//!
//! The feature table, fitted oracle and test-period scores are shared
//! read-only; each profile gets its own engine and state. Runs execute on the
//! rayon pool and come back in input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use tutor_core::analytics::MetricsBundle;
use tutor_core::engine::StrategyProfile;

use crate::report::{format_sharpe, BacktestReport};
use crate::runner::{PreparedRun, RunError};

pub fn compare_profiles(
    prepared: &PreparedRun,
    profiles: &[StrategyProfile],
    initial_capital: f64,
) -> Result<Vec<BacktestReport>, RunError> {
    profiles
        .par_iter()
        .map(|profile| prepared.simulate(profile, initial_capital))
        .collect()
}

/// One line of a comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub profile: String,
    pub final_capital: f64,
    pub metrics: MetricsBundle,
    pub cooldown_activations: usize,
    pub result_hash: String,
}

impl From<&BacktestReport> for ComparisonRow {
    fn from(report: &BacktestReport) -> Self {
        Self {
            profile: report.profile.name.clone(),
            final_capital: report.final_capital,
            metrics: report.metrics.clone(),
            cooldown_activations: report.cooldown_activations,
            result_hash: report.fingerprint.result_hash.clone(),
        }
    }
}

pub fn comparison_table(reports: &[BacktestReport]) -> String {
    let mut out = format!(
        "{:<14} {:>12} {:>9} {:>9} {:>7} {:>7} {:>10}\n",
        "Profile", "Final", "Return", "Max DD", "Sharpe", "Trades", "Cooldowns"
    );
    out.push_str(&"-".repeat(72));
    out.push('\n');
    for row in reports.iter().map(ComparisonRow::from) {
        out.push_str(&format!(
            "{:<14} {:>12.2} {:>8.2}% {:>8.2}% {:>7} {:>7} {:>10}\n",
            row.profile,
            row.final_capital,
            row.metrics.total_return * 100.0,
            row.metrics.max_drawdown * 100.0,
            format_sharpe(row.metrics.sharpe_ratio),
            row.metrics.num_trades,
            row.cooldown_activations,
        ));
    }
    out
}
