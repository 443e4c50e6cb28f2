//! Tutor Runner: run configuration, data loading and backtest orchestration.
//!
//! Builds on `tutor-core` to provide:
//! - TOML run configuration
//! - Data loading with cache / download / CSV / synthetic fallback
//! - Single runs: dataset build, oracle fit, simulation, report
//! - Parallel multi-profile comparison over one fitted oracle
//! - Feature importance and JSON/CSV artifact export

pub mod compare;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod importance;
pub mod report;
pub mod runner;

pub use compare::{compare_profiles, comparison_table, ComparisonRow};
pub use config::{ConfigError, ProfileSelection, RunConfig};
pub use data_loader::{
    download_symbols, import_csv, load_aligned, load_symbol, DownloadSummary, LoadError,
    LoadOptions, LoadedData,
};
pub use export::{export_equity_csv, export_json, export_trades_csv, import_json, save_artifacts};
pub use importance::{feature_importance, importance_table, FeatureImportance};
pub use report::{BacktestReport, ReportEquityPoint, SCHEMA_VERSION};
pub use runner::{
    build_dataset, prepare, preview_dataset, run_backtest, PreparedRun, RunError,
};
