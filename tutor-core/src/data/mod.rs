//! Price data: providers, validation, benchmark alignment and the Parquet cache.

pub mod align;
pub mod cache;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod validate;
pub mod yahoo;

pub use align::{align_with_benchmark, self_aligned, AlignedBar};
pub use cache::{CacheMeta, CacheStatus, CoverageResult, ParquetCache};
pub use csv_import::{read_bars_csv, CsvProvider};
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::SyntheticProvider;
pub use validate::{drop_incomplete, validate_bars, validate_dates, InputError};
pub use yahoo::YahooProvider;
