//! Deterministic synthetic bars for offline runs and tests.
//!
//! Each symbol gets its own random walk seeded from the blake3 hash of its
//! name, so the same symbol and range always produce the same series.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::Bar;

/// Random-walk generator for weekday bars.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    /// Mean daily return added to every step.
    pub drift: f64,
    /// Half-width of the uniform daily shock.
    pub shock: f64,
    pub start_price: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            drift: 0.0003,
            shock: 0.02,
            start_price: 100.0,
        }
    }
}

impl SyntheticProvider {
    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut current = start;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return = self.drift + rng.gen_range(-self.shock..=self.shock);
            let open = price;
            let close = (price * (1.0 + daily_return)).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(Bar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += chrono::Duration::days(1);
        }

        bars
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.generate(symbol, start, end);
        if bars.is_empty() {
            return Err(DataError::Other(format!(
                "no weekdays between {start} and {end}"
            )));
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn same_symbol_same_series() {
        let gen = SyntheticProvider::default();
        let a = gen.generate("SPY", d(2020, 1, 1), d(2020, 3, 1));
        let b = gen.generate("SPY", d(2020, 1, 1), d(2020, 3, 1));
        assert_eq!(a, b);
        let c = gen.generate("QQQ", d(2020, 1, 1), d(2020, 3, 1));
        assert_ne!(a, c);
    }

    #[test]
    fn skips_weekends_and_stays_sane() {
        let bars = SyntheticProvider::default().generate("SPY", d(2024, 1, 1), d(2024, 1, 14));
        assert_eq!(bars.len(), 10);
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(bars.iter().all(Bar::is_sane));
    }

    #[test]
    fn weekend_only_range_is_an_error() {
        let gen = SyntheticProvider::default();
        assert!(gen.fetch("SPY", d(2024, 1, 6), d(2024, 1, 7)).is_err());
    }
}
