//! FeaturePipeline: indicator and label columns derived from aligned bars.
//!
//! Features at row `i` read closes up to and including `i` only, with the one
//! exception of the [`RegimeThreshold::FullSeries`] stress flag. Labels read
//! the next `horizon` bars. Rows missing any feature or label are dropped.

pub mod labels;
pub mod regime;
pub mod rolling;
pub mod rsi;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{validate_dates, AlignedBar, InputError};
use crate::domain::{Bar, FeatureVector};
use crate::engine::SimulationBar;

pub use labels::{tercile_buckets, TargetLabels, VolatilityBucket};
pub use regime::{stress_flags, RegimeThreshold};
use labels::LabelColumns;
use rolling::{pct_change, rolling_mean, rolling_std, shift};

pub const MA_WINDOW: usize = 20;
pub const SLOPE_LAG: usize = 5;
pub const ATR_WINDOW: usize = 14;
pub const VOLATILITY_WINDOW: usize = 20;

/// Feature pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Bars ahead used by the labels.
    pub horizon: usize,
    pub regime: RegimeThreshold,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            horizon: 5,
            regime: RegimeThreshold::FullSeries,
        }
    }
}

/// Raw feature columns, `NaN` wherever the window is incomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    pub dates: Vec<NaiveDate>,
    pub return_5d: Vec<f64>,
    pub return_20d: Vec<f64>,
    pub ma_ratio: Vec<f64>,
    pub trend_slope_20d: Vec<f64>,
    pub rsi: Vec<f64>,
    pub atr: Vec<f64>,
    pub volatility_20d: Vec<f64>,
    pub regime_stress: Vec<bool>,
    pub relative_strength_spy: Vec<f64>,
}

impl FeatureColumns {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The features of row `i`, if every value is finite.
    pub fn vector(&self, i: usize) -> Option<FeatureVector> {
        let v = FeatureVector {
            return_5d: self.return_5d[i],
            return_20d: self.return_20d[i],
            ma_ratio: self.ma_ratio[i],
            trend_slope_20d: self.trend_slope_20d[i],
            rsi: self.rsi[i],
            atr: self.atr[i],
            volatility_20d: self.volatility_20d[i],
            regime_stress: self.regime_stress[i],
            relative_strength_spy: self.relative_strength_spy[i],
        };
        v.is_finite().then_some(v)
    }
}

/// Compute every feature column over `bars`.
pub fn compute_feature_columns(bars: &[AlignedBar], regime: RegimeThreshold) -> FeatureColumns {
    let closes: Vec<f64> = bars.iter().map(|b| b.bar.close).collect();
    let bench: Vec<f64> = bars.iter().map(|b| b.benchmark_close).collect();

    let ma = rolling_mean(&closes, MA_WINDOW);
    let ma_lagged = shift(&ma, SLOPE_LAG as isize);
    let return_20d = pct_change(&closes, 20);
    let bench_return_20d = pct_change(&bench, 20);
    let volatility_20d = rolling_std(&pct_change(&closes, 1), VOLATILITY_WINDOW);
    let regime_stress = stress_flags(&volatility_20d, regime);

    FeatureColumns {
        dates: bars.iter().map(AlignedBar::date).collect(),
        return_5d: pct_change(&closes, 5),
        ma_ratio: closes.iter().zip(&ma).map(|(c, m)| c / m).collect(),
        trend_slope_20d: ma
            .iter()
            .zip(&ma_lagged)
            .map(|(now, then)| (now - then) / then)
            .collect(),
        rsi: rsi::rsi(&closes, rsi::RSI_PERIOD),
        atr: rolling_std(&closes, ATR_WINDOW),
        relative_strength_spy: return_20d
            .iter()
            .zip(&bench_return_20d)
            .map(|(a, b)| a - b)
            .collect(),
        return_20d,
        volatility_20d,
        regime_stress,
    }
}

/// One complete dataset row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub bar: Bar,
    pub benchmark_close: f64,
    pub features: FeatureVector,
    pub labels: TargetLabels,
}

impl FeatureRow {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }

    /// What the engine may see of this row: no labels.
    pub fn simulation_bar(&self) -> SimulationBar {
        SimulationBar {
            date: self.bar.date,
            close: self.bar.close,
            features: self.features,
        }
    }
}

/// Feature + label table, ordered by date, incomplete rows removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
    dropped: usize,
}

impl FeatureTable {
    pub fn build(bars: &[AlignedBar], config: &FeatureConfig) -> Result<Self, InputError> {
        if bars.is_empty() {
            return Err(InputError::EmptySeries);
        }
        validate_dates(bars.iter().map(AlignedBar::date))?;

        let columns = compute_feature_columns(bars, config.regime);
        let closes: Vec<f64> = bars.iter().map(|b| b.bar.close).collect();
        let labels = LabelColumns::compute(&closes, config.horizon);

        let rows: Vec<FeatureRow> = bars
            .iter()
            .enumerate()
            .filter_map(|(i, aligned)| {
                Some(FeatureRow {
                    bar: aligned.bar.clone(),
                    benchmark_close: aligned.benchmark_close,
                    features: columns.vector(i)?,
                    labels: labels.row(i)?,
                })
            })
            .collect();

        let dropped = bars.len() - rows.len();
        debug!(rows = rows.len(), dropped, "feature table built");
        Ok(Self { rows, dropped })
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows removed for missing history or missing labels.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date(), self.rows.last()?.date()))
    }

    /// Rows before `date` and rows on or after it.
    pub fn split_at(&self, date: NaiveDate) -> (&[FeatureRow], &[FeatureRow]) {
        let idx = self.rows.partition_point(|r| r.date() < date);
        self.rows.split_at(idx)
    }

    /// The last `n` rows in a display-oriented shape.
    pub fn preview(&self, n: usize) -> DatasetPreview {
        let start = self.rows.len().saturating_sub(n);
        DatasetPreview {
            total_rows: self.rows.len(),
            date_range: self.date_range(),
            rows: self.rows[start..].iter().map(PreviewRow::from).collect(),
        }
    }
}

pub fn simulation_bars(rows: &[FeatureRow]) -> Vec<SimulationBar> {
    rows.iter().map(FeatureRow::simulation_bar).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPreview {
    pub total_rows: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub rows: Vec<PreviewRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub date: NaiveDate,
    pub close: f64,
    pub return_5d: f64,
    pub return_20d: f64,
    pub ma_ratio: f64,
    pub rsi: f64,
    pub volatility_20d: f64,
}

impl From<&FeatureRow> for PreviewRow {
    fn from(row: &FeatureRow) -> Self {
        Self {
            date: row.date(),
            close: row.bar.close,
            return_5d: row.features.return_5d,
            return_20d: row.features.return_20d,
            ma_ratio: row.features.ma_ratio,
            rsi: row.features.rsi,
            volatility_20d: row.features.volatility_20d,
        }
    }
}
