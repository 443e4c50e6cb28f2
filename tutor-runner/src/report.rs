//! The published outcome of one backtest run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tutor_core::analytics::{
    buy_and_hold_curve, feature_comparison, max_drawdown_window, split_trades, DrawdownWindow,
    FeatureComparison, MetricsBundle,
};
use tutor_core::domain::{Position, Trade};
use tutor_core::engine::{SimulationBar, SimulationResult, StrategyProfile};
use tutor_core::fingerprint::RunFingerprint;
use tutor_core::oracle::ModelEvaluation;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Strategy equity next to the buy-and-hold baseline on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportEquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
    pub buy_hold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub benchmark: String,
    pub profile: StrategyProfile,
    pub oracle: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub test_start: NaiveDate,
    pub equity_curve: Vec<ReportEquityPoint>,
    pub metrics: MetricsBundle,
    pub buy_hold_metrics: MetricsBundle,
    pub trades: Vec<Trade>,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub feature_comparison: BTreeMap<String, FeatureComparison>,
    /// `None` for an empty equity curve.
    pub max_drawdown: Option<DrawdownWindow>,
    /// Position still open after the last bar. Not booked into capital.
    pub open_position: Option<Position>,
    pub cooldown_activations: usize,
    pub model: ModelEvaluation,
    pub dataset_hash: String,
    pub fingerprint: RunFingerprint,
    pub synthetic: bool,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything a report is assembled from besides the simulation itself.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub symbol: &'a str,
    pub benchmark: &'a str,
    pub oracle: &'a str,
    pub initial_capital: f64,
    pub test_start: NaiveDate,
    pub bars: &'a [SimulationBar],
    pub model: &'a ModelEvaluation,
    pub dataset_hash: &'a str,
    pub synthetic: bool,
}

impl BacktestReport {
    pub fn build(
        ctx: &ReportContext<'_>,
        profile: &StrategyProfile,
        result: SimulationResult,
        fingerprint: RunFingerprint,
    ) -> Self {
        let buy_hold = buy_and_hold_curve(ctx.bars, ctx.initial_capital);
        let equity_curve = result
            .equity_curve
            .iter()
            .enumerate()
            .map(|(i, point)| ReportEquityPoint {
                date: point.date,
                equity: point.capital,
                buy_hold: buy_hold
                    .get(i)
                    .filter(|b| b.date == point.date)
                    .map(|b| b.capital),
            })
            .collect();

        let (winners, losers) = split_trades(&result.trades);
        let winning_trades = winners.len();
        let losing_trades = losers.len();

        Self {
            schema_version: SCHEMA_VERSION,
            symbol: ctx.symbol.to_string(),
            benchmark: ctx.benchmark.to_string(),
            profile: profile.clone(),
            oracle: ctx.oracle.to_string(),
            initial_capital: ctx.initial_capital,
            final_capital: result.final_capital,
            test_start: ctx.test_start,
            equity_curve,
            metrics: MetricsBundle::compute(&result.equity_curve, &result.trades),
            buy_hold_metrics: MetricsBundle::compute(&buy_hold, &[]),
            feature_comparison: feature_comparison(&result.trades),
            max_drawdown: max_drawdown_window(&result.equity_curve, &result.trades),
            winning_trades,
            losing_trades,
            trades: result.trades,
            open_position: result.open_position,
            cooldown_activations: result.cooldown_activations,
            model: ctx.model.clone(),
            dataset_hash: ctx.dataset_hash.to_string(),
            fingerprint,
            synthetic: ctx.synthetic,
        }
    }

    /// Trade by ledger index.
    pub fn trade(&self, index: usize) -> Option<&Trade> {
        self.trades.get(index)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.equity_curve.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.equity_curve.last().map(|p| p.date)
    }

    /// Human-readable summary for the terminal.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let range = match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => "empty".to_string(),
        };
        out.push_str(&format!("{} | {} | {}\n", self.symbol, self.profile, range));
        if self.synthetic {
            out.push_str("WARNING: synthetic data\n");
        }
        out.push_str(&format!(
            "  strategy:   return {:>8.2}%  max dd {:>8.2}%  sharpe {}  trades {}\n",
            self.metrics.total_return * 100.0,
            self.metrics.max_drawdown * 100.0,
            format_sharpe(self.metrics.sharpe_ratio),
            self.metrics.num_trades,
        ));
        out.push_str(&format!(
            "  buy & hold: return {:>8.2}%  max dd {:>8.2}%  sharpe {}\n",
            self.buy_hold_metrics.total_return * 100.0,
            self.buy_hold_metrics.max_drawdown * 100.0,
            format_sharpe(self.buy_hold_metrics.sharpe_ratio),
        ));
        out.push_str(&format!(
            "  capital {:.2} -> {:.2}  wins {} losses {}  cooldowns {}\n",
            self.initial_capital,
            self.final_capital,
            self.winning_trades,
            self.losing_trades,
            self.cooldown_activations,
        ));
        out.push_str(&format!(
            "  model: auc {}  accuracy {:.3} on {} rows\n",
            self.model
                .roc_auc
                .map_or_else(|| "n/a".to_string(), |auc| format!("{auc:.3}")),
            self.model.accuracy,
            self.model.test_rows,
        ));
        if let Some(dd) = &self.max_drawdown {
            out.push_str(&format!(
                "  worst drawdown {:.2}% from {} to {} ({} trades)\n",
                dd.drawdown * 100.0,
                dd.peak_date,
                dd.trough_date,
                dd.trades_in_window.len(),
            ));
        }
        out
    }
}

pub(crate) fn format_sharpe(sharpe: Option<f64>) -> String {
    sharpe.map_or_else(|| "   n/a".to_string(), |s| format!("{s:>6.2}"))
}
