//! Deterministic hashes of datasets and run outputs.
//!
//! Two runs on the same frozen input must produce the same `result_hash`.
//! Floats are hashed by bit pattern, so any numeric drift changes the hash.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::data::AlignedBar;
use crate::engine::{SimulationResult, StrategyProfile};

#[derive(Default)]
struct Fingerprinter(blake3::Hasher);

impl Fingerprinter {
    fn f64(&mut self, v: f64) -> &mut Self {
        self.0.update(&v.to_bits().to_le_bytes());
        self
    }

    fn u64(&mut self, v: u64) -> &mut Self {
        self.0.update(&v.to_le_bytes());
        self
    }

    fn date(&mut self, d: NaiveDate) -> &mut Self {
        self.0.update(&d.num_days_from_ce().to_le_bytes());
        self
    }

    fn str(&mut self, s: &str) -> &mut Self {
        self.u64(s.len() as u64);
        self.0.update(s.as_bytes());
        self
    }

    fn finish(&self) -> String {
        self.0.finalize().to_hex().to_string()
    }
}

/// Hash of the aligned input series (dates, OHLCV, benchmark close).
pub fn dataset_hash(bars: &[AlignedBar]) -> String {
    let mut h = Fingerprinter::default();
    for a in bars {
        h.date(a.bar.date)
            .f64(a.bar.open)
            .f64(a.bar.high)
            .f64(a.bar.low)
            .f64(a.bar.close)
            .u64(a.bar.volume)
            .f64(a.benchmark_close);
    }
    h.finish()
}

pub fn profile_hash(profile: &StrategyProfile) -> String {
    let mut h = Fingerprinter::default();
    h.str(&profile.name)
        .f64(profile.threshold)
        .u64(profile.hold_days as u64)
        .f64(profile.volatility_limit)
        .u64(profile.cooldown_enabled as u64)
        .f64(profile.normal_size)
        .f64(profile.cooldown_size)
        .u64(profile.loss_streak_trigger as u64)
        .u64(profile.cooldown_duration_days as u64);
    h.finish()
}

/// Hash of the equity curve and trade ledger.
pub fn result_hash(result: &SimulationResult) -> String {
    let mut h = Fingerprinter::default();
    h.u64(result.equity_curve.len() as u64);
    for p in &result.equity_curve {
        h.date(p.date).f64(p.capital);
    }
    h.u64(result.trades.len() as u64);
    for t in &result.trades {
        h.date(t.entry_date)
            .date(t.exit_date)
            .f64(t.entry_price)
            .f64(t.exit_price)
            .f64(t.pnl)
            .f64(t.position_size)
            .f64(t.entry_probability);
        for v in t.feature_snapshot.values() {
            h.f64(v);
        }
    }
    h.finish()
}

/// Identity of one run: what went in and what came out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub dataset_hash: String,
    pub profile_hash: String,
    pub result_hash: String,
}

impl RunFingerprint {
    pub fn compute(
        bars: &[AlignedBar],
        profile: &StrategyProfile,
        result: &SimulationResult,
    ) -> Self {
        Self {
            dataset_hash: dataset_hash(bars),
            profile_hash: profile_hash(profile),
            result_hash: result_hash(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{self_aligned, SyntheticProvider};

    fn bars() -> Vec<AlignedBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = start + chrono::Duration::days(30);
        let raw = SyntheticProvider::default().generate("SPY", start, end);
        self_aligned(&raw).unwrap()
    }

    #[test]
    fn dataset_hash_is_stable_and_sensitive() {
        let a = bars();
        assert_eq!(dataset_hash(&a), dataset_hash(&bars()));
        let mut b = a.clone();
        b[3].bar.close += 1e-9;
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn profile_hash_differs_between_presets() {
        assert_ne!(
            profile_hash(&StrategyProfile::conservative()),
            profile_hash(&StrategyProfile::aggressive())
        );
    }
}
