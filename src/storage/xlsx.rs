use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{debug, info};

use super::LedgerStore;
use crate::domain::{Cell, StoredRow, HEADERS};

/// Sheet name used when writing; reading always takes the first sheet.
pub const SHEET_NAME: &str = "Sheet1";

/// Number format applied to cells that were read as dates.
const DATE_NUM_FORMAT: &str = "dd/mm/yyyy hh:mm:ss";

/// Ledger stored as a single-sheet `.xlsx` workbook.
pub struct XlsxStore {
    path: PathBuf,
}

impl XlsxStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStore for XlsxStore {
    fn ensure_exists(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        write_workbook(&self.path, &[])
            .with_context(|| format!("Failed to create ledger file {}", self.path.display()))?;
        info!(path = %self.path.display(), "created empty ledger");
        Ok(true)
    }

    fn load_all(&self) -> Result<Vec<StoredRow>> {
        let rows = read_workbook(&self.path)
            .with_context(|| format!("Failed to read ledger file {}", self.path.display()))?;
        debug!(path = %self.path.display(), rows = rows.len(), "loaded ledger");
        Ok(rows)
    }

    fn save_all(&self, rows: &[StoredRow]) -> Result<()> {
        // Write next to the target and rename, so a failed save leaves the old file intact
        let temp = self.temp_path();
        write_workbook(&temp, rows)
            .with_context(|| format!("Failed to write ledger file {}", temp.display()))?;
        fs::rename(&temp, &self.path).with_context(|| {
            format!(
                "Failed to replace ledger file {} with {}",
                self.path.display(),
                temp.display()
            )
        })?;
        debug!(path = %self.path.display(), rows = rows.len(), "saved ledger");
        Ok(())
    }

    fn raw_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .with_context(|| format!("Failed to read ledger file {}", self.path.display()))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Write `rows` under the ledger header to a new workbook at `path`.
/// Each cell is written with the type it was read with.
pub fn write_workbook(path: &Path, rows: &[StoredRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = (index + 1) as u32;
        let cells = [&row.timestamp, &row.client, &row.payment_method, &row.amount];
        for (col, cell) in cells.into_iter().enumerate() {
            write_cell(sheet, line, col as u16, cell, &date_format)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    line: u32,
    col: u16,
    cell: &Cell,
    date_format: &Format,
) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Text(s) => {
            sheet.write_string(line, col, s.as_str())?;
        }
        Cell::Number(n) => {
            sheet.write_number(line, col, *n)?;
        }
        Cell::Bool(b) => {
            sheet.write_boolean(line, col, *b)?;
        }
        Cell::DateTime(serial) => {
            sheet.write_number_with_format(line, col, *serial, date_format)?;
        }
    }
    Ok(())
}

/// Read the first sheet of the workbook at `path`. Columns are located by header name.
pub fn read_workbook(path: &Path) -> Result<Vec<StoredRow>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no sheets"))??;

    let mut lines = range.rows();
    let header = lines.next().ok_or_else(|| anyhow!("Missing header row"))?;
    let columns = locate_columns(header)?;

    let mut rows = Vec::new();
    for line in lines {
        let row = StoredRow {
            timestamp: read_cell(line.get(columns[0])),
            client: read_cell(line.get(columns[1])),
            payment_method: read_cell(line.get(columns[2])),
            amount: read_cell(line.get(columns[3])),
        };

        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

fn locate_columns(header: &[Data]) -> Result<[usize; 4]> {
    let names: Vec<String> = header
        .iter()
        .map(|cell| read_cell(Some(cell)).to_string())
        .collect();
    let mut columns = [0; 4];

    for (slot, expected) in columns.iter_mut().zip(HEADERS) {
        match names.iter().position(|name| name.trim() == expected) {
            Some(index) => *slot = index,
            None => bail!(
                "Missing column '{}' (found: {})",
                expected,
                names.join(", ")
            ),
        }
    }

    Ok(columns)
}

fn read_cell(cell: Option<&Data>) -> Cell {
    match cell {
        None | Some(Data::Empty) => Cell::Empty,
        Some(Data::String(s)) => Cell::Text(s.clone()),
        Some(Data::Float(f)) => Cell::Number(*f),
        Some(Data::Int(i)) => Cell::Number(*i as f64),
        Some(Data::Bool(b)) => Cell::Bool(*b),
        Some(Data::DateTime(dt)) => Cell::DateTime(dt.as_f64()),
        Some(other) => Cell::Text(other.to_string()),
    }
}
