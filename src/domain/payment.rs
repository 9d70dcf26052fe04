use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Cell;

/// Canonical textual form of a payment timestamp: day/month/year, 24h clock.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Header row of the ledger sheet. Column order and names are part of the file contract.
pub const HEADERS: [&str; 4] = ["Fecha y hora", "Cliente", "Forma de pago", "Monto"];

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, RowError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|_| RowError::TimestampParse(text.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

impl PaymentMethod {
    /// Label written to the ledger file.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Transfer => "Transferencia",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "efectivo" | "cash" => Some(PaymentMethod::Cash),
            "transferencia" | "transfer" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One payment taken at the salon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Civil wall-clock time in the ledger's timezone
    pub timestamp: NaiveDateTime,
    pub client: String,
    pub payment_method: PaymentMethod,
    pub amount: f64,
}

impl PaymentRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        client: impl Into<String>,
        payment_method: PaymentMethod,
        amount: f64,
    ) -> Self {
        Self {
            timestamp,
            client: client.into(),
            payment_method,
            amount,
        }
    }

    /// Validate a stored row. Rows that fail stay in the ledger but are left out of totals.
    pub fn from_row(row: &StoredRow) -> Result<Self, RowError> {
        let timestamp = match row.timestamp.as_datetime() {
            Some(timestamp) => timestamp,
            None => parse_timestamp(&row.timestamp.to_string())?,
        };
        let method = row.payment_method.to_string();
        let payment_method = PaymentMethod::from_str(&method)
            .ok_or(RowError::UnknownPaymentMethod(method))?;
        let amount = row.amount.as_number().ok_or(RowError::MissingAmount)?;

        Ok(Self {
            timestamp,
            client: row.client.to_string(),
            payment_method,
            amount,
        })
    }

    pub fn to_row(&self) -> StoredRow {
        StoredRow {
            timestamp: Cell::Text(format_timestamp(&self.timestamp)),
            client: Cell::Text(self.client.clone()),
            payment_method: Cell::from(self.payment_method.as_str()),
            amount: Cell::Number(self.amount),
        }
    }
}

/// A ledger row as it sits in the spreadsheet, before validation.
/// Cells keep their original type so rows that fail validation are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub timestamp: Cell,
    pub client: Cell,
    pub payment_method: Cell,
    pub amount: Cell,
}

impl StoredRow {
    pub fn new(
        timestamp: impl Into<Cell>,
        client: impl Into<Cell>,
        payment_method: impl Into<Cell>,
        amount: impl Into<Cell>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            client: client.into(),
            payment_method: payment_method.into(),
            amount: amount.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.timestamp.is_empty()
            && self.client.is_empty()
            && self.payment_method.is_empty()
            && self.amount.is_empty()
    }
}

/// Why a stored row was left out of the totals.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("timestamp {0:?} does not match DD/MM/YYYY HH:MM:SS")]
    TimestampParse(String),

    #[error("unknown payment method {0:?}")]
    UnknownPaymentMethod(String),

    #[error("amount is missing or not a number")]
    MissingAmount,
}
