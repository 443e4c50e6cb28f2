//! Bar-by-bar loop of the backtest engine.

use tracing::{debug, info};

use super::profile::{ConfigError, StrategyProfile};
use super::state::{EngineState, SimulationResult};
use super::{BacktestError, SimulationBar};
use crate::data::{validate_dates, InputError};
use crate::domain::{FeatureVector, Position};
use crate::oracle::SignalOracle;

/// A validated profile, starting capital and oracle, ready to run.
///
/// Runs do not share state: every call to [`BacktestEngine::run`] starts from
/// the initial capital with a flat position and a fresh risk state.
pub struct BacktestEngine<'a> {
    profile: StrategyProfile,
    initial_capital: f64,
    oracle: &'a dyn SignalOracle,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(
        profile: StrategyProfile,
        initial_capital: f64,
        oracle: &'a dyn SignalOracle,
    ) -> Result<Self, ConfigError> {
        profile.validate()?;
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(ConfigError::InvalidCapital(initial_capital));
        }
        Ok(Self {
            profile,
            initial_capital,
            oracle,
        })
    }

    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Score `bars` with the oracle, then simulate.
    pub fn run(&self, bars: &[SimulationBar]) -> Result<SimulationResult, BacktestError> {
        validate_dates(bars.iter().map(|b| b.date))?;
        let features: Vec<FeatureVector> = bars.iter().map(|b| b.features).collect();
        let probabilities = self.oracle.predict(&features)?;
        self.run_with_probabilities(bars, &probabilities)
    }

    /// Simulate with probabilities already produced by the oracle, one per bar.
    pub fn run_with_probabilities(
        &self,
        bars: &[SimulationBar],
        probabilities: &[f64],
    ) -> Result<SimulationResult, BacktestError> {
        validate_dates(bars.iter().map(|b| b.date))?;
        validate_probabilities(probabilities, bars.len())?;

        info!(
            profile = %self.profile.name,
            oracle = self.oracle.name(),
            bars = bars.len(),
            "backtest started"
        );

        let policy = self.profile.cooldown_policy();
        let mut state = EngineState::new(self.initial_capital);
        state.equity_curve.reserve(bars.len());

        for (bar, &probability) in bars.iter().zip(probabilities) {
            if let Some(until) = state.risk.expire(bar.date) {
                debug!(%until, date = %bar.date, "cooldown elapsed");
            }

            // Entry size is fixed before this bar's exit can change the risk state.
            let in_cooldown = state.risk.is_in_cooldown(bar.date);
            let position_size = if in_cooldown {
                self.profile.cooldown_size
            } else {
                self.profile.normal_size
            };

            let exit_due = state
                .position
                .position()
                .is_some_and(|p| p.days_held(bar.date) >= self.profile.hold_days);
            if exit_due {
                state.close_position(bar.date, bar.close, &policy);
            }

            if state.position.is_flat()
                && probability >= self.profile.threshold
                && bar.features.volatility_20d < self.profile.volatility_limit
            {
                state.open_position(Position {
                    entry_date: bar.date,
                    entry_price: bar.close,
                    entry_probability: probability,
                    feature_snapshot: bar.features,
                    position_size,
                });
            }

            state.mark(bar.date);
        }

        let result = state.into_result();
        info!(
            profile = %self.profile.name,
            trades = result.trades.len(),
            final_capital = result.final_capital,
            cooldowns = result.cooldown_activations,
            "backtest finished"
        );
        Ok(result)
    }
}

fn validate_probabilities(probabilities: &[f64], expected: usize) -> Result<(), InputError> {
    if probabilities.len() != expected {
        return Err(InputError::ProbabilityCountMismatch {
            expected,
            got: probabilities.len(),
        });
    }
    match probabilities
        .iter()
        .position(|p| !(0.0..=1.0).contains(p))
    {
        Some(index) => Err(InputError::InvalidProbability {
            index,
            value: probabilities[index],
        }),
        None => Ok(()),
    }
}
