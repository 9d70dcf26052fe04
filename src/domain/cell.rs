use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{format_timestamp, parse_amount};

/// A spreadsheet cell value, kept in its original type so a save writes back what was read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Date-formatted number, as an Excel serial date (days since 1899-12-30)
    DateTime(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric value of the cell. Text counts when it parses as an amount.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_amount(s).ok(),
            _ => None,
        }
    }

    /// Date and time of a date-formatted cell.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(serial) => excel_serial_to_datetime(*serial),
            _ => None,
        }
    }
}

/// Convert an Excel serial date to a naive date-time, rounded to the second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => f.pad(""),
            Cell::Text(s) => f.pad(s),
            Cell::Number(n) => f.pad(&n.to_string()),
            Cell::Bool(b) => f.pad(if *b { "TRUE" } else { "FALSE" }),
            Cell::DateTime(serial) => match excel_serial_to_datetime(*serial) {
                Some(dt) => f.pad(&format_timestamp(&dt)),
                None => f.pad(&serial.to_string()),
            },
        }
    }
}

impl PartialEq<&str> for Cell {
    fn eq(&self, other: &&str) -> bool {
        match self {
            Cell::Text(s) => s == other,
            Cell::Empty => other.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<Option<f64>> for Cell {
    fn from(n: Option<f64>) -> Self {
        n.map(Cell::Number).unwrap_or_default()
    }
}
