//! Tutor Core: point-in-time features, the backtest engine and its analytics.
//!
//! - Domain types (bars, feature vectors, positions, trades, risk state)
//! - Price data providers, validation, benchmark alignment and the Parquet cache
//! - Feature pipeline with forward-looking training labels
//! - Signal oracle trait and a logistic-regression oracle
//! - Sequential backtest engine with loss-streak cooldown
//! - Performance analytics and run fingerprints

pub mod analytics;
pub mod data;
pub mod domain;
pub mod engine;
pub mod features;
pub mod fingerprint;
pub mod oracle;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared across parallel runs are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send_sync<T: Send + Sync>() {}

        require_send_sync::<domain::Bar>();
        require_send_sync::<domain::FeatureVector>();
        require_send_sync::<domain::Position>();
        require_send_sync::<domain::Trade>();
        require_send_sync::<domain::RiskState>();
        require_send_sync::<features::FeatureTable>();
        require_send_sync::<engine::StrategyProfile>();
        require_send_sync::<engine::SimulationResult>();
        require_send_sync::<engine::BacktestEngine<'static>>();
        require_send_sync::<oracle::LogisticOracle>();
        require_send_sync::<fingerprint::RunFingerprint>();
    }

    /// The engine reaches the oracle only through the trait object it was built with.
    #[test]
    fn engine_accepts_any_oracle() {
        fn _check(
            oracle: &dyn oracle::SignalOracle,
        ) -> Result<engine::BacktestEngine<'_>, engine::ConfigError> {
            let profile = engine::StrategyProfile::conservative();
            engine::BacktestEngine::new(profile, 10_000.0, oracle)
        }
    }
}
