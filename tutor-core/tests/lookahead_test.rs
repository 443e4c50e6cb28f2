//! Look-ahead contamination tests for the feature pipeline.
//!
//! No feature value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..150) and on the full series
//! (bars 0..300) and require identical values on the shared prefix. The
//! full-series regime flag is the one known exception and is tested as such.

use chrono::NaiveDate;
use tutor_core::data::AlignedBar;
use tutor_core::domain::Bar;
use tutor_core::features::{compute_feature_columns, FeatureColumns, RegimeThreshold};

const TRUNCATED: usize = 150;
const FULL: usize = 300;

/// Deterministic pseudo-random walk for the primary and a smoother benchmark.
fn make_aligned(n: usize) -> Vec<AlignedBar> {
    let base_date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut price = 100.0_f64;
    let mut bench = 300.0_f64;

    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed >> 33) % 200) as f64 / 100.0 - 1.0; // -1.0 to +1.0
            // volatility regime shifts late in the series
            let scale = if i > 200 { 4.0 } else { 1.0 };
            price = (price + change * scale).max(10.0);
            bench += (i as f64 * 0.07).sin();

            AlignedBar {
                bar: Bar {
                    date: base_date + chrono::Duration::days(i as i64),
                    open: price - 0.2,
                    high: price + 1.0,
                    low: price - 1.0,
                    close: price,
                    volume: 1_000 + i as u64,
                },
                benchmark_close: bench,
            }
        })
        .collect()
}

fn assert_prefix_equal(name: &str, truncated: &[f64], full: &[f64]) {
    assert_eq!(truncated.len(), TRUNCATED, "{name}: length mismatch");
    for i in 0..TRUNCATED {
        let (t, f) = (truncated[i], full[i]);
        let same = (t.is_nan() && f.is_nan()) || t == f;
        assert!(same, "{name}: look-ahead at bar {i}: truncated={t}, full={f}");
    }
}

fn columns(n: usize, regime: RegimeThreshold) -> FeatureColumns {
    compute_feature_columns(&make_aligned(FULL)[..n], regime)
}

#[test]
fn numeric_features_are_point_in_time() {
    let truncated = columns(TRUNCATED, RegimeThreshold::FullSeries);
    let full = columns(FULL, RegimeThreshold::FullSeries);

    assert_eq!(truncated.dates[..], full.dates[..TRUNCATED]);
    assert_prefix_equal("return_5d", &truncated.return_5d, &full.return_5d);
    assert_prefix_equal("return_20d", &truncated.return_20d, &full.return_20d);
    assert_prefix_equal("ma_ratio", &truncated.ma_ratio, &full.ma_ratio);
    assert_prefix_equal("trend_slope_20d", &truncated.trend_slope_20d, &full.trend_slope_20d);
    assert_prefix_equal("rsi", &truncated.rsi, &full.rsi);
    assert_prefix_equal("atr", &truncated.atr, &full.atr);
    assert_prefix_equal("volatility_20d", &truncated.volatility_20d, &full.volatility_20d);
    assert_prefix_equal(
        "relative_strength_spy",
        &truncated.relative_strength_spy,
        &full.relative_strength_spy,
    );
}

#[test]
fn trailing_regime_flag_is_point_in_time() {
    let policy = RegimeThreshold::Trailing { window: 60 };
    let truncated = columns(TRUNCATED, policy);
    let full = columns(FULL, policy);
    assert_eq!(truncated.regime_stress[..], full.regime_stress[..TRUNCATED]);
}

#[test]
fn full_series_regime_flag_sees_the_future() {
    // The late high-volatility regime raises the full-series threshold, so
    // some early bars flagged on the truncated series lose their flag.
    let truncated = columns(TRUNCATED, RegimeThreshold::FullSeries);
    let full = columns(FULL, RegimeThreshold::FullSeries);
    assert_ne!(truncated.regime_stress[..], full.regime_stress[..TRUNCATED]);
}

#[test]
fn warmup_is_nan_not_zero() {
    let full = columns(FULL, RegimeThreshold::FullSeries);
    assert!(full.return_20d[..20].iter().all(|v| v.is_nan()));
    assert!(full.trend_slope_20d[..24].iter().all(|v| v.is_nan()));
    assert!(full.trend_slope_20d[24].is_finite());
    assert!(full.vector(23).is_none());
    assert!(full.vector(24).is_some());
}
