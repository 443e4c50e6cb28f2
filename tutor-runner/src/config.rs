//! TOML run configuration.
//!
//! Every field has a default, so an empty document is a valid config:
//!
//! ```toml
//! symbol = "QQQ"
//! benchmark = "SPY"
//! profile = "aggressive"
//! initial_capital = 10000.0
//! start = "2015-01-01"
//! test_start = "2020-01-01"
//!
//! [features.regime]
//! policy = "trailing"
//! window = 252
//! ```
//!
//! `profile` is either a preset name or an inline table with every
//! `StrategyProfile` field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use tutor_core::engine::StrategyProfile;
use tutor_core::features::FeatureConfig;
use tutor_core::oracle::LogisticConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid profile: {0}")]
    Profile(#[from] tutor_core::engine::ConfigError),

    #[error("test_start {test_start} must fall after start {start}")]
    TestStartBeforeStart {
        start: NaiveDate,
        test_start: NaiveDate,
    },

    #[error("end {end} must fall after test_start {test_start}")]
    EndBeforeTestStart {
        test_start: NaiveDate,
        end: NaiveDate,
    },
}

/// A preset name or a fully specified profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSelection {
    Named(String),
    Inline(StrategyProfile),
}

impl Default for ProfileSelection {
    fn default() -> Self {
        Self::Named("conservative".into())
    }
}

impl ProfileSelection {
    pub fn resolve(&self) -> Result<StrategyProfile, tutor_core::engine::ConfigError> {
        let profile = match self {
            Self::Named(name) => name.parse()?,
            Self::Inline(profile) => profile.clone(),
        };
        profile.validate()?;
        Ok(profile)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub symbol: String,
    /// Benchmark for `relative_strength_spy`. Equal to `symbol` means self-relative.
    pub benchmark: String,
    pub profile: ProfileSelection,
    pub initial_capital: f64,
    /// First date of price history to load.
    pub start: NaiveDate,
    /// Last date to load; `None` means today.
    pub end: Option<NaiveDate>,
    /// Rows dated on or after this are scored and simulated; earlier rows train the model.
    pub test_start: NaiveDate,
    pub cache_dir: PathBuf,
    /// Directory of `<SYMBOL>.csv` files tried after the cache and the network.
    pub csv_dir: Option<PathBuf>,
    pub offline: bool,
    pub synthetic: bool,
    pub features: FeatureConfig,
    pub model: LogisticConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbol: "QQQ".into(),
            benchmark: "SPY".into(),
            profile: ProfileSelection::default(),
            initial_capital: 10_000.0,
            start: ymd(2015, 1, 1),
            end: None,
            test_start: ymd(2020, 1, 1),
            cache_dir: PathBuf::from("data"),
            csv_dir: None,
            offline: false,
            synthetic: false,
            features: FeatureConfig::default(),
            model: LogisticConfig::default(),
        }
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

impl RunConfig {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Check date ordering and resolve the profile.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.test_start <= self.start {
            return Err(ConfigError::TestStartBeforeStart {
                start: self.start,
                test_start: self.test_start,
            });
        }
        if let Some(end) = self.end {
            if end <= self.test_start {
                return Err(ConfigError::EndBeforeTestStart {
                    test_start: self.test_start,
                    end,
                });
            }
        }
        self.profile.resolve()?;
        Ok(())
    }

    pub fn resolve_profile(&self) -> Result<StrategyProfile, ConfigError> {
        Ok(self.profile.resolve()?)
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
