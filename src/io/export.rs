use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::application::LedgerService;
use crate::domain::HEADERS;
use crate::storage::{write_workbook, LedgerStore};

/// File name of the day-closure workbook for `day`: `cierre_DD-MM-YYYY.xlsx`.
pub fn closure_file_name(day: NaiveDate) -> String {
    format!("cierre_{}.xlsx", day.format("%d-%m-%Y"))
}

/// Output format of a full-ledger export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// The stored workbook, byte for byte
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" => Some(ExportFormat::Xlsx),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// A day-closure workbook that was written to disk.
#[derive(Debug, Clone)]
pub struct DayClosure {
    pub path: PathBuf,
    pub rows: usize,
}

/// Exporter for producing downloadable copies of the ledger.
/// Exports only read the ledger; they never change it.
pub struct Exporter<'a, S: LedgerStore> {
    service: &'a LedgerService<S>,
}

impl<'a, S: LedgerStore> Exporter<'a, S> {
    pub fn new(service: &'a LedgerService<S>) -> Self {
        Self { service }
    }

    /// Write today's payments to `dir`, named after today's date.
    pub fn close_day(&self, dir: &Path) -> Result<Option<DayClosure>> {
        self.close_day_at(dir, self.service.now())
    }

    /// Write the payments dated `now` to `dir`, in ledger order and with the ledger's headers.
    /// Returns `None`, writing nothing, when there were no payments that day.
    pub fn close_day_at(&self, dir: &Path, now: DateTime<Tz>) -> Result<Option<DayClosure>> {
        let day = now.date_naive();
        let loaded = self.service.load()?;
        let rows = loaded.rows_on(day);

        if rows.is_empty() {
            info!(%day, "no payments to close");
            return Ok(None);
        }

        let path = dir.join(closure_file_name(day));
        write_workbook(&path, &rows)
            .with_context(|| format!("Failed to write day closure {}", path.display()))?;
        info!(path = %path.display(), rows = rows.len(), "wrote day closure");

        Ok(Some(DayClosure {
            path,
            rows: rows.len(),
        }))
    }

    /// Export the whole ledger in `format`. Returns bytes written for xlsx, rows for csv.
    pub fn export_ledger<W: Write>(&self, format: ExportFormat, writer: W) -> Result<usize> {
        match format {
            ExportFormat::Xlsx => self.export_ledger_raw(writer),
            ExportFormat::Csv => self.export_ledger_csv(writer),
        }
    }

    /// Copy the persisted ledger file, byte for byte.
    pub fn export_ledger_raw<W: Write>(&self, mut writer: W) -> Result<usize> {
        let bytes = self.service.store().raw_bytes()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(bytes.len())
    }

    /// Export every stored row, valid or not, to CSV under the ledger headers.
    pub fn export_ledger_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let loaded = self.service.load()?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(HEADERS)?;

        let mut count = 0;
        for row in loaded.ledger.rows() {
            csv_writer.write_record([
                row.timestamp.to_string(),
                row.client.to_string(),
                row.payment_method.to_string(),
                row.amount.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}
