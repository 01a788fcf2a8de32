use crate::models::ListingRecord;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const UTF8_BOM: &[u8] = "\u{feff}".as_bytes();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    #[default]
    Both,
}

impl ExportFormat {
    fn includes_csv(&self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }

    fn includes_json(&self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }
}

/// Write records as CSV with the fixed 9-column header
pub fn write_csv<W: Write>(mut writer: W, records: &[ListingRecord], bom: bool) -> Result<()> {
    if bom {
        writer.write_all(UTF8_BOM)?;
    }

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(ListingRecord::COLUMNS)?;
    for record in records {
        csv.write_record(record.row())?;
    }
    csv.flush()?;
    Ok(())
}

/// Write records as a pretty-printed JSON array
pub fn write_json<W: Write>(writer: W, records: &[ListingRecord]) -> Result<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// `woningen-export-2025-01-31.csv`
pub fn export_filename(date: NaiveDate, extension: &str) -> String {
    format!("woningen-export-{}.{}", date.format("%Y-%m-%d"), extension)
}

/// Write the requested formats into `dir`, returning the written paths
pub async fn export_records(
    dir: &Path,
    records: &[ListingRecord],
    format: ExportFormat,
    bom: bool,
    date: NaiveDate,
) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();

    if format.includes_csv() {
        let mut buf = Vec::new();
        write_csv(&mut buf, records, bom)?;
        let path = dir.join(export_filename(date, "csv"));
        tokio::fs::write(&path, buf)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Saved {} listings to {}", records.len(), path.display());
        written.push(path);
    }

    if format.includes_json() {
        let mut buf = Vec::new();
        write_json(&mut buf, records)?;
        let path = dir.join(export_filename(date, "json"));
        tokio::fs::write(&path, buf)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Saved {} listings to {}", records.len(), path.display());
        written.push(path);
    }

    Ok(written)
}
