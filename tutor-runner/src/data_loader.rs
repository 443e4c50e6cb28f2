//! Bar loading and benchmark alignment for the runner.
//!
//! Each symbol is resolved by the first source that has data for the range:
//! 1. Parquet cache covering the range (skipped with `force`); a partial cache is
//!    used as-is offline and refreshed otherwise
//! 2. Provider download, written back to the cache (skipped when offline)
//! 3. `<csv_dir>/<SYMBOL>.csv`, if a CSV directory is configured
//! 4. Synthetic bars, only with `synthetic`; the result is tagged
//! 5. Otherwise a `LoadError` naming the symbol
//!
//! Rows with a non-finite price are dropped before alignment.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use tutor_core::data::{
    align_with_benchmark, drop_incomplete, read_bars_csv, self_aligned, validate_bars,
    AlignedBar, CoverageResult, CsvProvider, DataError, DataProvider, DataSource, InputError,
    ParquetCache, SyntheticProvider,
};
use tutor_core::domain::Bar;
use tutor_core::fingerprint::dataset_hash;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(
        "no cached data for '{symbol}' and network access is disabled (use --synthetic for synthetic data)"
    )]
    NoDataOffline { symbol: String },

    #[error("no data for '{symbol}': {reason}")]
    Unavailable { symbol: String, reason: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("invalid price series: {0}")]
    Input(#[from] InputError),
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Never make network requests.
    pub offline: bool,
    /// Generate synthetic bars when no real source has data.
    pub synthetic: bool,
    /// Ignore the cache and re-download.
    pub force: bool,
    pub csv_dir: Option<PathBuf>,
}

/// Aligned bars plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub symbol: String,
    pub benchmark: String,
    pub aligned: Vec<AlignedBar>,
    pub sources: BTreeMap<String, DataSource>,
    /// Rows removed for non-finite prices, summed over both series.
    pub dropped_rows: usize,
    pub has_synthetic: bool,
    pub dataset_hash: String,
}

/// Resolve one symbol's bars through the fallback chain.
pub fn load_symbol(
    symbol: &str,
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<(Vec<Bar>, DataSource), LoadError> {
    let network = !opts.offline && provider.is_some();
    let mut partial: Option<Vec<Bar>> = None;

    if !opts.force {
        match cache.covers_range(symbol, opts.start, opts.end) {
            CoverageResult::FullyCovered => match cache.load(symbol) {
                Ok(bars) => {
                    let bars = within(bars, opts.start, opts.end);
                    if !bars.is_empty() {
                        debug!(symbol, bars = bars.len(), "loaded from cache");
                        return Ok((bars, DataSource::Cache));
                    }
                }
                Err(e) => debug!(symbol, error = %e, "cache miss"),
            },
            CoverageResult::PartiallyCovered {
                cached_start,
                cached_end,
            } => match cache.load(symbol) {
                Ok(bars) => {
                    let bars = within(bars, opts.start, opts.end);
                    if bars.is_empty() {
                        debug!(symbol, "no cached bars in range");
                    } else if !network {
                        warn!(
                            symbol,
                            %cached_start,
                            %cached_end,
                            requested_start = %opts.start,
                            requested_end = %opts.end,
                            "cache covers only part of the requested range"
                        );
                        return Ok((bars, DataSource::Cache));
                    } else {
                        debug!(symbol, %cached_start, %cached_end, "partial cache, refreshing");
                        partial = Some(bars);
                    }
                }
                Err(e) => debug!(symbol, error = %e, "cache miss"),
            },
            CoverageResult::NotCached => debug!(symbol, "not cached"),
        }
    }

    let mut last_error: Option<DataError> = None;

    if !opts.offline {
        if let Some(provider) = provider {
            match provider.fetch(symbol, opts.start, opts.end) {
                Ok(fetched) if !fetched.bars.is_empty() => {
                    info!(
                        symbol,
                        provider = provider.name(),
                        bars = fetched.bars.len(),
                        "downloaded"
                    );
                    if let Err(e) = cache.write(symbol, &fetched.bars, provider.name()) {
                        warn!(symbol, error = %e, "failed to cache downloaded bars");
                    }
                    return Ok((fetched.bars, fetched.source));
                }
                Ok(_) => debug!(symbol, "provider returned no bars"),
                Err(e) => {
                    warn!(symbol, error = %e, "download failed");
                    last_error = Some(e);
                }
            }
        }
    }

    if let Some(bars) = partial {
        warn!(
            symbol,
            bars = bars.len(),
            "download unavailable, using partial cache"
        );
        return Ok((bars, DataSource::Cache));
    }

    if let Some(dir) = &opts.csv_dir {
        let csv = CsvProvider::new(dir);
        match csv.fetch(symbol, opts.start, opts.end) {
            Ok(fetched) if !fetched.bars.is_empty() => {
                debug!(symbol, path = %csv.path_for(symbol).display(), "loaded from csv");
                return Ok((fetched.bars, fetched.source));
            }
            Ok(_) => {}
            Err(e) => last_error = Some(e),
        }
    }

    if opts.synthetic {
        warn!(
            symbol,
            "generating synthetic data; results will be tagged as synthetic"
        );
        let fetched = SyntheticProvider::default().fetch(symbol, opts.start, opts.end)?;
        return Ok((fetched.bars, fetched.source));
    }

    match last_error {
        Some(e) => Err(LoadError::Unavailable {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        }),
        None if opts.offline || provider.is_none() => Err(LoadError::NoDataOffline {
            symbol: symbol.to_string(),
        }),
        None => Err(LoadError::Unavailable {
            symbol: symbol.to_string(),
            reason: format!("no bars between {} and {}", opts.start, opts.end),
        }),
    }
}

/// Load `symbol` and `benchmark` and inner-join them on date.
pub fn load_aligned(
    symbol: &str,
    benchmark: &str,
    cache: &ParquetCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let mut sources = BTreeMap::new();

    let (mut primary, source) = load_symbol(symbol, cache, provider, opts)?;
    sources.insert(symbol.to_string(), source);
    let mut dropped_rows = drop_incomplete(&mut primary);

    let aligned = if benchmark == symbol {
        self_aligned(&primary)?
    } else {
        let (mut bench, source) = load_symbol(benchmark, cache, provider, opts)?;
        sources.insert(benchmark.to_string(), source);
        dropped_rows += drop_incomplete(&mut bench);
        align_with_benchmark(&primary, &bench)?
    };

    if dropped_rows > 0 {
        warn!(symbol, dropped_rows, "dropped bars with non-finite prices");
    }

    let has_synthetic = sources.values().any(|s| *s == DataSource::Synthetic);
    let dataset_hash = dataset_hash(&aligned);
    info!(
        symbol,
        benchmark,
        rows = aligned.len(),
        synthetic = has_synthetic,
        "aligned price data"
    );

    Ok(LoadedData {
        symbol: symbol.to_string(),
        benchmark: benchmark.to_string(),
        aligned,
        sources,
        dropped_rows,
        has_synthetic,
        dataset_hash,
    })
}

fn within(bars: Vec<Bar>, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    bars.into_iter()
        .filter(|b| b.date >= start && b.date <= end)
        .collect()
}

/// Outcome of a multi-symbol download.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub succeeded: Vec<(String, usize)>,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fetch each symbol from `provider` and write it to the cache.
///
/// One symbol failing does not stop the others.
pub fn download_symbols(
    provider: &dyn DataProvider,
    cache: &ParquetCache,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
) -> DownloadSummary {
    let mut summary = DownloadSummary::default();
    for symbol in symbols {
        let outcome = provider.fetch(symbol, start, end).and_then(|fetched| {
            cache.write(symbol, &fetched.bars, provider.name())?;
            Ok(fetched.bars.len())
        });
        match outcome {
            Ok(count) => {
                info!(symbol, bars = count, "cached");
                summary.succeeded.push((symbol.to_string(), count));
            }
            Err(e) => {
                warn!(symbol, error = %e, "download failed");
                summary.errors.push((symbol.to_string(), e));
            }
        }
    }
    summary
}

/// Read a CSV price file and store it in the cache under `symbol`.
///
/// Returns the number of bars cached.
pub fn import_csv(cache: &ParquetCache, symbol: &str, path: &Path) -> Result<usize, LoadError> {
    let mut bars = read_bars_csv(path)?;
    let dropped = drop_incomplete(&mut bars);
    if dropped > 0 {
        warn!(symbol, dropped, "dropped bars with non-finite prices");
    }
    validate_bars(&bars)?;
    cache.write(symbol, &bars, "csv")?;
    info!(symbol, bars = bars.len(), path = %path.display(), "imported csv");
    Ok(bars.len())
}
