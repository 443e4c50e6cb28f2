//! Tutor CLI: backtest, compare and inspect the bullish-probability strategy.
//!
//! Commands:
//! - `run`: fit the model, simulate one profile, print and optionally save the report
//! - `compare`: simulate several profiles over one fitted model
//! - `importance`: rank features by logistic coefficient
//! - `preview`: show the last rows of the feature table
//! - `download`: fetch symbols from Yahoo Finance into the Parquet cache
//! - `import`: load a CSV price file into the Parquet cache
//! - `cache`: show the cached date range of each symbol

mod logging;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use tutor_core::data::{DataProvider, ParquetCache, YahooProvider};
use tutor_core::engine::StrategyProfile;
use tutor_core::features::DatasetPreview;
use tutor_runner::{
    compare_profiles, comparison_table, download_symbols, export_json, feature_importance,
    import_csv, importance_table, prepare, preview_dataset, run_backtest, save_artifacts,
    ProfileSelection, RunConfig,
};

#[derive(Parser)]
#[command(
    name = "tutor",
    about = "Tutor CLI: probability-driven trading backtests with loss-streak cooldown"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the model on the training period and backtest one profile on the test period.
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Profile: conservative, aggressive or ultra.
        #[arg(long)]
        profile: Option<String>,

        /// Write report.json, trades.csv and equity.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full report as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Backtest several profiles on the same data and model.
    Compare {
        #[command(flatten)]
        data: DataArgs,

        /// Comma-separated profile names. Defaults to all presets.
        #[arg(long, value_delimiter = ',')]
        profiles: Vec<String>,
    },
    /// Rank features by the fitted model's coefficients.
    Importance {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Show the most recent rows of the feature table.
    Preview {
        #[command(flatten)]
        data: DataArgs,

        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Download symbols from Yahoo Finance into the Parquet cache.
    Download {
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 2015-01-01.
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Attempts per symbol after the first request fails.
        #[arg(long, default_value_t = 3)]
        retries: u32,
    },
    /// Import a CSV price file (date,open,high,low,close,volume) into the cache.
    Import {
        symbol: String,

        path: PathBuf,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Show what the cache holds for each symbol.
    Cache {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
}

/// Data selection shared by the commands that build a dataset.
#[derive(Args, Debug)]
struct DataArgs {
    /// TOML run configuration. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    symbol: Option<String>,

    /// Benchmark symbol for relative strength. Defaults to SPY.
    #[arg(long)]
    benchmark: Option<String>,

    /// First date of price history (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date of price history (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// First date of the simulated period; earlier rows train the model.
    #[arg(long)]
    test_start: Option<NaiveDate>,

    #[arg(long)]
    capital: Option<f64>,

    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Directory of <SYMBOL>.csv files used when the cache and network have no data.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Never touch the network.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Fall back to synthetic prices (results are tagged).
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

impl DataArgs {
    fn to_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(symbol) = &self.symbol {
            config.symbol = symbol.to_ascii_uppercase();
        }
        if let Some(benchmark) = &self.benchmark {
            config.benchmark = benchmark.to_ascii_uppercase();
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = Some(end);
        }
        if let Some(test_start) = self.test_start {
            config.test_start = test_start;
        }
        if let Some(capital) = self.capital {
            config.initial_capital = capital;
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.csv_dir {
            config.csv_dir = Some(dir.clone());
        }
        config.offline |= self.offline;
        config.synthetic |= self.synthetic;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Run {
            data,
            profile,
            output_dir,
            json,
        } => run_cmd(&data, profile, output_dir, json),
        Commands::Compare { data, profiles } => compare_cmd(&data, &profiles),
        Commands::Importance { data } => importance_cmd(&data),
        Commands::Preview { data, rows } => preview_cmd(&data, rows),
        Commands::Download {
            symbols,
            start,
            end,
            cache_dir,
            retries,
        } => download_cmd(&symbols, start, end, cache_dir, retries),
        Commands::Import {
            symbol,
            path,
            cache_dir,
        } => import_cmd(&symbol, &path, cache_dir),
        Commands::Cache { symbols, cache_dir } => cache_cmd(&symbols, cache_dir),
    }
}

/// Yahoo provider unless the run is offline.
fn network_provider(config: &RunConfig) -> Result<Option<YahooProvider>> {
    if config.offline {
        return Ok(None);
    }
    Ok(Some(YahooProvider::new()?))
}

fn run_cmd(
    data: &DataArgs,
    profile: Option<String>,
    output_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut config = data.to_config()?;
    if let Some(name) = profile {
        config.profile = ProfileSelection::Named(name);
    }
    config.validate()?;
    debug!(?config, "resolved run configuration");

    let provider = network_provider(&config)?;
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);
    let report = run_backtest(&config, provider_ref)
        .with_context(|| format!("backtest of {} failed", config.symbol))?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print!("{}", report.summary());
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn compare_cmd(data: &DataArgs, names: &[String]) -> Result<()> {
    let config = data.to_config()?;
    let profiles = if names.is_empty() {
        StrategyProfile::presets()
    } else {
        names
            .iter()
            .map(|n| n.parse::<StrategyProfile>())
            .collect::<Result<Vec<_>, _>>()?
    };

    let provider = network_provider(&config)?;
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);
    let prepared = prepare(&config, provider_ref)
        .with_context(|| format!("failed to prepare {}", config.symbol))?;
    let reports = compare_profiles(&prepared, &profiles, config.initial_capital)?;

    if prepared.loaded.has_synthetic {
        println!("WARNING: synthetic data");
    }
    print!("{}", comparison_table(&reports));
    Ok(())
}

fn importance_cmd(data: &DataArgs) -> Result<()> {
    let config = data.to_config()?;
    let provider = network_provider(&config)?;
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);
    let prepared = prepare(&config, provider_ref)
        .with_context(|| format!("failed to prepare {}", config.symbol))?;

    println!(
        "{} trained on rows before {} ({} iterations)",
        config.symbol,
        config.test_start,
        prepared.oracle.iterations()
    );
    print!("{}", importance_table(&feature_importance(&prepared.oracle)));
    Ok(())
}

fn preview_cmd(data: &DataArgs, rows: usize) -> Result<()> {
    let config = data.to_config()?;
    let provider = network_provider(&config)?;
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);
    let preview = preview_dataset(&config, provider_ref, rows)?;
    print_preview(&config.symbol, &preview);
    Ok(())
}

fn print_preview(symbol: &str, preview: &DatasetPreview) {
    match preview.date_range {
        Some((first, last)) => println!(
            "{symbol}: {} rows from {first} to {last}",
            preview.total_rows
        ),
        None => println!("{symbol}: no rows"),
    }
    println!(
        "{:<12} {:>10} {:>9} {:>9} {:>9} {:>7} {:>9}",
        "Date", "Close", "Ret 5d", "Ret 20d", "MA ratio", "RSI", "Vol 20d"
    );
    for row in &preview.rows {
        println!(
            "{:<12} {:>10.2} {:>9.4} {:>9.4} {:>9.4} {:>7.2} {:>9.4}",
            row.date.to_string(),
            row.close,
            row.return_5d,
            row.return_20d,
            row.ma_ratio,
            row.rsi,
            row.volatility_20d
        );
    }
}

fn download_cmd(
    symbols: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    cache_dir: PathBuf,
    retries: u32,
) -> Result<()> {
    let start = start.unwrap_or(RunConfig::default().start);
    let end = end.unwrap_or_else(|| chrono::Local::now().date_naive());
    if end < start {
        bail!("end {end} is before start {start}");
    }

    let provider = YahooProvider::new()?.with_retries(retries);
    let cache = ParquetCache::new(cache_dir);
    let upper: Vec<String> = symbols.iter().map(|s| s.to_ascii_uppercase()).collect();
    let refs: Vec<&str> = upper.iter().map(String::as_str).collect();

    let summary = download_symbols(&provider, &cache, &refs, start, end);
    for (symbol, count) in &summary.succeeded {
        println!("{symbol}: {count} bars cached");
    }
    if !summary.all_succeeded() {
        for (symbol, err) in &summary.errors {
            eprintln!("Error for {symbol}: {err}");
        }
        bail!(
            "{} of {} downloads failed",
            summary.errors.len(),
            symbols.len()
        );
    }
    Ok(())
}

fn import_cmd(symbol: &str, path: &std::path::Path, cache_dir: PathBuf) -> Result<()> {
    let cache = ParquetCache::new(cache_dir);
    let symbol = symbol.to_ascii_uppercase();
    let count = import_csv(&cache, &symbol, path)
        .with_context(|| format!("failed to import {}", path.display()))?;
    println!("{symbol}: {count} bars imported");
    Ok(())
}

fn cache_cmd(symbols: &[String], cache_dir: PathBuf) -> Result<()> {
    let cache = ParquetCache::new(cache_dir);
    let upper: Vec<String> = symbols.iter().map(|s| s.to_ascii_uppercase()).collect();
    let refs: Vec<&str> = upper.iter().map(String::as_str).collect();

    println!("{:<8} {:<12} {:<12} {:>8}", "Symbol", "First", "Last", "Bars");
    for status in cache.status(&refs) {
        match (status.start_date, status.end_date, status.bar_count) {
            (Some(first), Some(last), Some(count)) => println!(
                "{:<8} {:<12} {:<12} {:>8}",
                status.symbol,
                first.to_string(),
                last.to_string(),
                count
            ),
            _ => println!("{:<8} not cached", status.symbol),
        }
    }
    Ok(())
}
