//! Property tests for engine and analytics invariants.
//!
//! Uses proptest to verify:
//! 1. Capital recurrence: capital moves only on exits, by exactly `1 + size * pnl`
//! 2. Holding period: every trade is held at least `hold_days` calendar days
//! 3. Loss-streak law and cooldown sizing
//! 4. Drawdown bounds and the max-drawdown window
//! 5. Idempotence: identical inputs give identical outputs

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use tutor_core::analytics::{drawdown, max_drawdown, max_drawdown_window};
use tutor_core::domain::{capital_values, FeatureVector};
use tutor_core::engine::{BacktestEngine, SimulationBar, SimulationResult, StrategyProfile};
use tutor_core::oracle::FixedOracle;

// ── Strategies (proptest) ────────────────────────────────────────────

/// (close, probability, days since previous bar)
fn arb_path() -> impl Strategy<Value = Vec<(f64, f64, i64)>> {
    prop::collection::vec((50.0..150.0_f64, 0.0..=1.0_f64, 1..4_i64), 10..150)
}

fn arb_profile() -> impl Strategy<Value = StrategyProfile> {
    (0.2..0.8_f64, 1..10_i64, any::<bool>(), 1..5_u32, 5..40_i64).prop_map(
        |(threshold, hold_days, cooldown_enabled, trigger, duration)| StrategyProfile {
            name: "prop".into(),
            threshold,
            hold_days,
            volatility_limit: 1.0,
            cooldown_enabled,
            normal_size: 1.0,
            cooldown_size: 0.3,
            loss_streak_trigger: trigger,
            cooldown_duration_days: duration,
        },
    )
}

fn flat_features() -> FeatureVector {
    FeatureVector {
        return_5d: 0.0,
        return_20d: 0.0,
        ma_ratio: 1.0,
        trend_slope_20d: 0.0,
        rsi: 50.0,
        atr: 1.0,
        volatility_20d: 0.01,
        regime_stress: false,
        relative_strength_spy: 0.0,
    }
}

fn build(path: &[(f64, f64, i64)]) -> (Vec<SimulationBar>, FixedOracle) {
    let mut date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut bars = Vec::with_capacity(path.len());
    for &(close, _, gap) in path {
        date += Duration::days(gap);
        bars.push(SimulationBar {
            date,
            close,
            features: flat_features(),
        });
    }
    let probs = path.iter().map(|p| p.1).collect();
    (bars, FixedOracle::new(probs))
}

fn simulate(
    path: &[(f64, f64, i64)],
    profile: &StrategyProfile,
) -> (Vec<SimulationBar>, SimulationResult) {
    let (bars, oracle) = build(path);
    let engine = BacktestEngine::new(profile.clone(), 10_000.0, &oracle).unwrap();
    let result = engine.run(&bars).unwrap();
    (bars, result)
}

// ── 1. Capital recurrence ────────────────────────────────────────────

proptest! {
    #[test]
    fn capital_changes_only_by_closed_trades(path in arb_path(), profile in arb_profile()) {
        let (bars, result) = simulate(&path, &profile);
        prop_assert_eq!(result.equity_curve.len(), bars.len());

        let mut capital = 10_000.0;
        let mut trades = result.trades.iter().peekable();
        for point in &result.equity_curve {
            while let Some(t) = trades.next_if(|t| t.exit_date == point.date) {
                capital *= 1.0 + t.position_size * (t.exit_price / t.entry_price - 1.0);
            }
            prop_assert_eq!(point.capital, capital);
        }
        prop_assert!(trades.next().is_none());
        prop_assert_eq!(result.final_capital, capital);
    }
}

// ── 2. Holding period and state exclusivity ──────────────────────────

proptest! {
    #[test]
    fn trades_respect_hold_days_and_never_overlap(path in arb_path(), profile in arb_profile()) {
        let (_, result) = simulate(&path, &profile);
        for t in &result.trades {
            prop_assert!(t.days_held() >= profile.hold_days);
            prop_assert!(t.entry_date < t.exit_date);
        }
        for pair in result.trades.windows(2) {
            // the next position opens no earlier than the previous one closed
            prop_assert!(pair[1].entry_date >= pair[0].exit_date);
        }
        if let (Some(open), Some(last)) = (&result.open_position, result.trades.last()) {
            prop_assert!(open.entry_date >= last.exit_date);
        }
    }
}

// ── 3. Loss streak and cooldown ──────────────────────────────────────

proptest! {
    #[test]
    fn loss_streak_follows_closed_pnls(path in arb_path(), profile in arb_profile()) {
        let (_, result) = simulate(&path, &profile);

        let mut streak = 0;
        let mut activations = 0;
        for t in &result.trades {
            if t.pnl > 0.0 {
                streak = 0;
            } else {
                streak += 1;
                if profile.cooldown_enabled && streak >= profile.loss_streak_trigger {
                    streak = 0;
                    activations += 1;
                }
            }
        }
        prop_assert_eq!(result.final_risk.loss_streak(), streak);
        prop_assert_eq!(result.cooldown_activations, activations);
        if !profile.cooldown_enabled {
            prop_assert_eq!(activations, 0);
        }
    }

    #[test]
    fn entries_during_cooldown_use_reduced_size(path in arb_path(), profile in arb_profile()) {
        let (_, result) = simulate(&path, &profile);

        // exit dates of the trades that triggered a cooldown
        let mut triggers = Vec::new();
        let mut streak = 0;
        for t in &result.trades {
            streak = if t.pnl > 0.0 { 0 } else { streak + 1 };
            if profile.cooldown_enabled && streak >= profile.loss_streak_trigger {
                streak = 0;
                triggers.push(t.exit_date);
            }
        }

        let duration = Duration::days(profile.cooldown_duration_days);
        let entries = result
            .trades
            .iter()
            .map(|t| (t.entry_date, t.position_size))
            .chain(result.open_position.iter().map(|p| (p.entry_date, p.position_size)));
        for (entry, size) in entries {
            let in_cooldown = triggers.iter().any(|&e| e < entry && entry < e + duration);
            let expected = if in_cooldown { profile.cooldown_size } else { profile.normal_size };
            prop_assert_eq!(size, expected, "entry on {}", entry);
        }
    }
}

// ── 4. Drawdown ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_is_never_positive(equity in prop::collection::vec(1.0..1000.0_f64, 1..200)) {
        let dd = drawdown(&equity);
        prop_assert!(dd.iter().all(|d| *d <= 0.0));
        let min = dd.iter().copied().fold(f64::INFINITY, f64::min);
        prop_assert_eq!(max_drawdown(&equity), min.min(0.0));
    }

    #[test]
    fn window_peak_is_max_before_trough(path in arb_path(), profile in arb_profile()) {
        let (_, result) = simulate(&path, &profile);
        let window = max_drawdown_window(&result.equity_curve, &result.trades).unwrap();
        let equity = capital_values(&result.equity_curve);
        prop_assert!(window.peak_date <= window.trough_date);
        prop_assert_eq!(window.drawdown, max_drawdown(&equity));

        let peak_value = result
            .equity_curve
            .iter()
            .find(|p| p.date == window.peak_date)
            .map(|p| p.capital)
            .unwrap();
        let best_before = result
            .equity_curve
            .iter()
            .filter(|p| p.date <= window.trough_date)
            .map(|p| p.capital)
            .fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(peak_value, best_before);
        for t in &window.trades_in_window {
            prop_assert!(window.peak_date <= t.entry_date && t.entry_date <= window.trough_date);
        }
    }
}

// ── 5. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn same_input_same_output(path in arb_path(), profile in arb_profile()) {
        let (_, first) = simulate(&path, &profile);
        let (_, second) = simulate(&path, &profile);
        prop_assert_eq!(&first, &second);
    }
}
