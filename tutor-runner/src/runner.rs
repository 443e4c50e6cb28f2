//! Single-run orchestration.
//!
//! A run goes: load and align prices, build the feature table, split on
//! `test_start`, fit the logistic oracle on the training rows, score the test
//! rows once, simulate, then assemble the report. Nothing is published until
//! every stage has succeeded.
//!
//! `prepare()` stops before the simulation so several profiles can share one
//! fitted oracle and one set of scores (see `compare`).

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use tutor_core::data::{DataProvider, InputError, ParquetCache};
use tutor_core::engine::{BacktestEngine, BacktestError, SimulationBar, StrategyProfile};
use tutor_core::features::{simulation_bars, DatasetPreview, FeatureTable};
use tutor_core::fingerprint::RunFingerprint;
use tutor_core::oracle::{LogisticOracle, ModelEvaluation, OracleError, SignalOracle};

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_aligned, LoadError, LoadOptions, LoadedData};
use crate::report::{BacktestReport, ReportContext};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Data(#[from] LoadError),

    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("model error: {0}")]
    Oracle(#[from] OracleError),

    #[error("backtest failed: {0}")]
    Backtest(#[from] BacktestError),

    #[error("no feature rows before {test_start} to train on")]
    EmptyTrainingPeriod { test_start: NaiveDate },

    #[error("no feature rows on or after {test_start} to simulate")]
    EmptyTestPeriod { test_start: NaiveDate },
}

impl From<tutor_core::engine::ConfigError> for RunError {
    fn from(e: tutor_core::engine::ConfigError) -> Self {
        Self::Config(ConfigError::Profile(e))
    }
}

pub fn load_options(config: &RunConfig) -> LoadOptions {
    LoadOptions {
        start: config.start,
        end: config.end_date(),
        offline: config.offline,
        synthetic: config.synthetic,
        force: false,
        csv_dir: config.csv_dir.clone(),
    }
}

/// Load prices and build the feature table.
pub fn build_dataset(
    config: &RunConfig,
    provider: Option<&dyn DataProvider>,
) -> Result<(LoadedData, FeatureTable), RunError> {
    let cache = ParquetCache::new(&config.cache_dir);
    let loaded = load_aligned(
        &config.symbol,
        &config.benchmark,
        &cache,
        provider,
        &load_options(config),
    )?;
    let table = FeatureTable::build(&loaded.aligned, &config.features)?;
    info!(
        symbol = %config.symbol,
        rows = table.len(),
        dropped = table.dropped(),
        "built feature table"
    );
    Ok((loaded, table))
}

/// Dataset preview without fitting a model.
pub fn preview_dataset(
    config: &RunConfig,
    provider: Option<&dyn DataProvider>,
    rows: usize,
) -> Result<DatasetPreview, RunError> {
    let (_, table) = build_dataset(config, provider)?;
    Ok(table.preview(rows))
}

/// A fitted oracle and its scores over the test period, ready to simulate.
pub struct PreparedRun {
    pub loaded: LoadedData,
    pub table: FeatureTable,
    pub test_start: NaiveDate,
    pub oracle: LogisticOracle,
    pub evaluation: ModelEvaluation,
    pub test_bars: Vec<SimulationBar>,
    pub probabilities: Vec<f64>,
}

pub fn prepare(
    config: &RunConfig,
    provider: Option<&dyn DataProvider>,
) -> Result<PreparedRun, RunError> {
    config.validate()?;
    let (loaded, table) = build_dataset(config, provider)?;
    let test_start = config.test_start;

    let (train, test) = table.split_at(test_start);
    if train.is_empty() {
        return Err(RunError::EmptyTrainingPeriod { test_start });
    }
    if test.is_empty() {
        return Err(RunError::EmptyTestPeriod { test_start });
    }

    let oracle = LogisticOracle::fit_rows(train, &config.model)?;
    let test_bars = simulation_bars(test);
    let features: Vec<_> = test_bars.iter().map(|b| b.features).collect();
    let probabilities = oracle.predict(&features)?;

    let labels: Vec<bool> = test.iter().map(|r| r.labels.target_trend).collect();
    let evaluation = ModelEvaluation::evaluate(&probabilities, &labels);
    info!(
        train_rows = train.len(),
        test_rows = test.len(),
        iterations = oracle.iterations(),
        roc_auc = ?evaluation.roc_auc,
        accuracy = evaluation.accuracy,
        "fitted {}",
        oracle.name()
    );

    Ok(PreparedRun {
        loaded,
        table,
        test_start,
        oracle,
        evaluation,
        test_bars,
        probabilities,
    })
}

impl PreparedRun {
    /// Simulate one profile with a freshly constructed engine.
    pub fn simulate(
        &self,
        profile: &StrategyProfile,
        initial_capital: f64,
    ) -> Result<BacktestReport, RunError> {
        let engine = BacktestEngine::new(profile.clone(), initial_capital, &self.oracle)?;
        let result = engine.run_with_probabilities(&self.test_bars, &self.probabilities)?;
        let fingerprint = RunFingerprint::compute(&self.loaded.aligned, profile, &result);

        let ctx = ReportContext {
            symbol: &self.loaded.symbol,
            benchmark: &self.loaded.benchmark,
            oracle: self.oracle.name(),
            initial_capital,
            test_start: self.test_start,
            bars: &self.test_bars,
            model: &self.evaluation,
            dataset_hash: &self.loaded.dataset_hash,
            synthetic: self.loaded.has_synthetic,
        };
        Ok(BacktestReport::build(&ctx, profile, result, fingerprint))
    }
}

/// Run the configured profile end to end.
pub fn run_backtest(
    config: &RunConfig,
    provider: Option<&dyn DataProvider>,
) -> Result<BacktestReport, RunError> {
    let profile = config.resolve_profile()?;
    let prepared = prepare(config, provider)?;
    prepared.simulate(&profile, config.initial_capital)
}
