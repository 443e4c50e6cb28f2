//! Benchmark alignment.
//!
//! The primary series is joined to the benchmark close on date (inner join):
//! a date survives only if both series have a bar for it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::validate::{validate_bars, InputError};
use crate::domain::Bar;

/// A primary bar paired with the benchmark close of the same date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedBar {
    pub bar: Bar,
    pub benchmark_close: f64,
}

impl AlignedBar {
    pub fn date(&self) -> NaiveDate {
        self.bar.date
    }
}

/// Inner-join `primary` and `benchmark` on date, preserving primary order.
pub fn align_with_benchmark(
    primary: &[Bar],
    benchmark: &[Bar],
) -> Result<Vec<AlignedBar>, InputError> {
    validate_bars(primary)?;
    validate_bars(benchmark)?;

    let closes: HashMap<NaiveDate, f64> = benchmark.iter().map(|b| (b.date, b.close)).collect();

    let aligned: Vec<AlignedBar> = primary
        .iter()
        .filter_map(|bar| {
            closes.get(&bar.date).map(|&benchmark_close| AlignedBar {
                bar: bar.clone(),
                benchmark_close,
            })
        })
        .collect();

    if aligned.is_empty() {
        return Err(InputError::EmptySeries);
    }
    Ok(aligned)
}

/// Pair a series with itself (primary symbol is its own benchmark).
pub fn self_aligned(primary: &[Bar]) -> Result<Vec<AlignedBar>, InputError> {
    validate_bars(primary)?;
    Ok(primary
        .iter()
        .map(|bar| AlignedBar {
            bar: bar.clone(),
            benchmark_close: bar.close,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> Bar {
        Bar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
        }
    }

    #[test]
    fn inner_join_drops_unmatched_dates() {
        let primary = vec![
            bar("2024-01-02", 100.0),
            bar("2024-01-03", 101.0),
            bar("2024-01-04", 102.0),
        ];
        let benchmark = vec![bar("2024-01-02", 400.0), bar("2024-01-04", 402.0)];

        let aligned = align_with_benchmark(&primary, &benchmark).unwrap();
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0].benchmark_close, 400.0);
        assert_eq!(aligned[1].bar.close, 102.0);
    }

    #[test]
    fn disjoint_series_is_empty_error() {
        let primary = vec![bar("2024-01-02", 100.0)];
        let benchmark = vec![bar("2024-02-02", 400.0)];
        assert_eq!(
            align_with_benchmark(&primary, &benchmark),
            Err(InputError::EmptySeries)
        );
    }

    #[test]
    fn rejects_unsorted_primary() {
        let primary = vec![bar("2024-01-03", 100.0), bar("2024-01-02", 100.0)];
        let benchmark = vec![bar("2024-01-02", 400.0)];
        assert!(align_with_benchmark(&primary, &benchmark).is_err());
    }

    #[test]
    fn self_alignment_uses_own_close() {
        let primary = vec![bar("2024-01-02", 100.0), bar("2024-01-03", 99.0)];
        let aligned = self_aligned(&primary).unwrap();
        assert_eq!(aligned[1].benchmark_close, 99.0);
    }
}
