use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{PaymentMethod, PaymentRecord, RowError, StoredRow};

/// How "this month" is matched when computing the monthly total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthScope {
    /// Month number only: May 2023 and May 2024 both count in May 2024.
    #[default]
    MonthOfYear,
    /// Month and year must both match.
    CalendarMonth,
}

impl MonthScope {
    pub fn matches(&self, timestamp: &NaiveDateTime, now: &NaiveDateTime) -> bool {
        match self {
            MonthScope::MonthOfYear => timestamp.month() == now.month(),
            MonthScope::CalendarMonth => {
                timestamp.month() == now.month() && timestamp.year() == now.year()
            }
        }
    }
}

/// A valid record together with its position in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub position: usize,
    pub record: PaymentRecord,
}

/// A stored row that could not be used for totals.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// Spreadsheet row number (the header is row 1)
    pub line: usize,
    pub error: RowError,
}

/// The whole ledger in insertion order. Position is the only identity a row has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    rows: Vec<StoredRow>,
}

impl Ledger {
    pub fn new(rows: Vec<StoredRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[StoredRow] {
        &self.rows
    }

    /// Validate every row. A bad row never stops the others from loading.
    pub fn entries(&self) -> (Vec<LedgerEntry>, Vec<RowIssue>) {
        let mut entries = Vec::with_capacity(self.rows.len());
        let mut issues = Vec::new();

        for (index, row) in self.rows.iter().enumerate() {
            match PaymentRecord::from_row(row) {
                Ok(record) => entries.push(LedgerEntry {
                    position: index,
                    record,
                }),
                Err(error) => issues.push(RowIssue {
                    line: index + 2,
                    error,
                }),
            }
        }

        (entries, issues)
    }
}

/// Sum of amounts paid with `method` on the calendar date `day`.
pub fn daily_total<'a>(
    records: impl IntoIterator<Item = &'a PaymentRecord>,
    method: PaymentMethod,
    day: NaiveDate,
) -> f64 {
    records
        .into_iter()
        .filter(|r| r.payment_method == method && r.timestamp.date() == day)
        .fold(0.0, |total, r| total + r.amount)
}

/// Sum of all amounts whose timestamp falls in the month of `now`, per `scope`.
pub fn monthly_total<'a>(
    records: impl IntoIterator<Item = &'a PaymentRecord>,
    now: &NaiveDateTime,
    scope: MonthScope,
) -> f64 {
    records
        .into_iter()
        .filter(|r| scope.matches(&r.timestamp, now))
        .fold(0.0, |total, r| total + r.amount)
}
