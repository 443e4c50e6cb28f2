//! BacktestEngine: one sequential pass over scored bars.
//!
//! Per bar, in this order:
//! 1. Cooldown check, which fixes the size of any entry on this bar
//! 2. Exit once the open position has been held `hold_days` calendar days
//! 3. Entry when flat, probability >= threshold and volatility < limit
//! 4. Equity point with the post-update capital
//!
//! Exit before entry allows a same-bar flip.

pub mod loop_runner;
pub mod profile;
pub mod state;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::InputError;
use crate::domain::FeatureVector;
use crate::oracle::OracleError;

pub use loop_runner::BacktestEngine;
pub use profile::{ConfigError, StrategyProfile};
pub use state::{EngineState, SimulationResult};

/// The engine's view of one bar: price and point-in-time features, no labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationBar {
    pub date: NaiveDate,
    pub close: f64,
    pub features: FeatureVector,
}

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("oracle failed: {0}")]
    Oracle(#[from] OracleError),
}
