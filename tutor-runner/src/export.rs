//! Artifact export: `report.json`, `trades.csv` and `equity.csv`.
//!
//! Reports carry a `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tutor_core::domain::{Trade, FEATURE_COLUMNS};

use crate::report::{BacktestReport, ReportEquityPoint, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// One row per trade with its entry feature snapshot in column order.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "entry_date",
        "exit_date",
        "days_held",
        "entry_price",
        "exit_price",
        "position_size",
        "pnl",
        "entry_probability",
    ];
    header.extend(FEATURE_COLUMNS);
    wtr.write_record(&header)
        .context("failed to write trades CSV header")?;

    for trade in trades {
        let mut record = vec![
            trade.entry_date.to_string(),
            trade.exit_date.to_string(),
            trade.days_held().to_string(),
            format!("{:.6}", trade.entry_price),
            format!("{:.6}", trade.exit_price),
            format!("{:.4}", trade.position_size),
            format!("{:.6}", trade.pnl),
            format!("{:.6}", trade.entry_probability),
        ];
        record.extend(
            trade
                .feature_snapshot
                .values()
                .iter()
                .map(|v| format!("{v:.6}")),
        );
        wtr.write_record(&record)
            .context("failed to write trade CSV row")?;
    }

    let bytes = wtr.into_inner().context("failed to flush trades CSV")?;
    String::from_utf8(bytes).context("trades CSV is not valid UTF-8")
}

pub fn export_equity_csv(curve: &[ReportEquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity", "buy_hold"])
        .context("failed to write equity CSV header")?;

    for point in curve {
        let buy_hold = point
            .buy_hold
            .map(|v| format!("{v:.2}"))
            .unwrap_or_default();
        wtr.write_record([
            point.date.to_string(),
            format!("{:.2}", point.equity),
            buy_hold,
        ])
        .context("failed to write equity CSV row")?;
    }

    let bytes = wtr.into_inner().context("failed to flush equity CSV")?;
    String::from_utf8(bytes).context("equity CSV is not valid UTF-8")
}

// ─── Artifact directory ─────────────────────────────────────────────

/// Directory name for a run: symbol, profile and the first 12 hex digits of the result hash.
pub fn run_dir_name(report: &BacktestReport) -> String {
    let hash = &report.fingerprint.result_hash;
    let short = hash.get(..12).unwrap_or(hash);
    format!("{}_{}_{}", report.symbol, report.profile.name, short)
}

/// Write all three artifacts under `output_dir/<run_dir_name>`. Returns the run directory.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(run_dir_name(report));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create {}", run_dir.display()))?;

    write_file(&run_dir.join("report.json"), &export_json(report)?)?;
    write_file(&run_dir.join("trades.csv"), &export_trades_csv(&report.trades)?)?;
    write_file(
        &run_dir.join("equity.csv"),
        &export_equity_csv(&report.equity_curve)?,
    )?;

    Ok(run_dir)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
