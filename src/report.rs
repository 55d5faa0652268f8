use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::db::Store;
use crate::error::{AppError, Result};

/// The two reports derivable from one run's snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportKind {
    /// Coins with no priced snapshot row for the target currency.
    NoTradeInCurrency,
    /// Coins whose absolute 24h change exceeds `threshold` percent.
    LargeChange24h { threshold: f64 },
}

impl ReportKind {
    fn file_stem(&self, currency: &str) -> String {
        match self {
            ReportKind::NoTradeInCurrency => format!("coins_not_traded_vs_{currency}"),
            ReportKind::LargeChange24h { threshold } => {
                format!("price_change_over_{threshold}pct_in_24h_vs_{currency}")
            }
        }
    }
}

/// Run the report query for `kind` and write the result as a CSV under
/// `{out_dir}/{run timestamp}/`. With `timestamp: None` the latest recorded
/// ingestion for `currency` is used; if none exists the call fails with
/// `NotFound` before any directory or file is created.
pub async fn generate_report(
    store: &Store,
    kind: ReportKind,
    currency: &str,
    timestamp: Option<i64>,
    out_dir: &Path,
) -> Result<PathBuf> {
    let timestamp = match timestamp {
        Some(ts) => ts,
        None => store.latest_timestamp(currency).await?,
    };

    let stem = kind.file_stem(currency);
    let path = match kind {
        ReportKind::NoTradeInCurrency => {
            let rows = store.untraded_coins(currency, timestamp).await?;
            let path = report_path(out_dir, &stem, timestamp)?;
            write_csv(&path, &["id", "symbol", "name"], &rows)?;
            path
        }
        ReportKind::LargeChange24h { threshold } => {
            let rows = store.large_changes(currency, timestamp, threshold).await?;
            let path = report_path(out_dir, &stem, timestamp)?;
            write_csv(
                &path,
                &["id", "symbol", "name", "price_change_percentage_24h"],
                &rows,
            )?;
            path
        }
    };

    info!(report = %stem, path = %path.display(), "report generated");
    Ok(path)
}

/// `{out_dir}/{%Y_%m_%d__%H_%M_%S}/{stem}.csv`, creating the run directory
/// (and any missing parents) on the way.
fn report_path(out_dir: &Path, stem: &str, timestamp: i64) -> Result<PathBuf> {
    let stamp = format_run_timestamp(timestamp)?;
    let dir = out_dir.join(stamp);
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(format!("{stem}.csv")))
}

fn format_run_timestamp(timestamp: i64) -> Result<String> {
    let dt = chrono::DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| AppError::Config(format!("run timestamp {timestamp} is out of range")))?;
    Ok(dt.format("%Y_%m_%d__%H_%M_%S").to_string())
}

/// Write rows with an explicit header record, so an empty result set still
/// produces a header-only file.
fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
