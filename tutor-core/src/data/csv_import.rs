//! CSV price import.
//!
//! Reads `{dir}/{SYMBOL}.csv`. Header names are matched case-insensitively, so
//! both `date,open,high,low,close,volume` and Yahoo's
//! `Date,Open,High,Low,Close,Adj Close,Volume` exports are accepted. Extra
//! columns are ignored.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use super::validate::InputError;
use crate::domain::Bar;

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Reads bars from per-symbol CSV files in a directory.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let bars = read_bars_csv(&path)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}

/// Parse a CSV file of daily bars. Rows are sorted by date on return.
pub fn read_bars_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let csv_err = |reason: String| DataError::Csv {
        path: path.display().to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_err(e.to_string()))?;

    let headers = reader.headers().map_err(|e| csv_err(e.to_string()))?.clone();
    let mut index = [0usize; 6];
    for (slot, name) in index.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| InputError::MissingColumn(name.to_string()))?;
    }
    let [date_i, open_i, high_i, low_i, close_i, volume_i] = index;

    let mut bars = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_err(e.to_string()))?;
        let field = |i: usize| record.get(i).unwrap_or("");
        let price = |i: usize| -> f64 { field(i).parse::<f64>().unwrap_or(f64::NAN) };

        let date = parse_date(field(date_i))
            .ok_or_else(|| csv_err(format!("row {}: invalid date '{}'", row + 1, field(date_i))))?;
        let volume = field(volume_i).parse::<f64>().unwrap_or(0.0).max(0.0) as u64;

        bars.push(Bar {
            date,
            open: price(open_i),
            high: price(high_i),
            low: price(low_i),
            close: price(close_i),
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
