// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use salon_ledger::application::{LedgerService, PaymentForm};
use salon_ledger::config::{DEFAULT_TIMEZONE, LedgerConfig};
use salon_ledger::domain::{PaymentMethod, StoredRow};
use salon_ledger::storage::LedgerStore;
use tempfile::TempDir;

/// Helper to create a test service over a ledger file in a temporary directory
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    test_service_with(|config| config)
}

/// Same as `test_service`, with a chance to adjust the configuration
pub fn test_service_with(
    adjust: impl FnOnce(LedgerConfig) -> LedgerConfig,
) -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let config = adjust(LedgerConfig::new(temp_dir.path().join("peluqueria.xlsx")));
    let service = LedgerService::open(config)?;
    Ok((service, temp_dir))
}

/// Buenos Aires wall-clock time
pub fn ba(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Tz> {
    DEFAULT_TIMEZONE
        .with_ymd_and_hms(y, m, d, h, min, s)
        .unwrap()
}

pub fn form(client: &str, method: PaymentMethod, amount: &str) -> PaymentForm {
    PaymentForm::new(client, method, amount)
}

/// Record a payment at a fixed instant
pub fn pay(
    service: &LedgerService,
    client: &str,
    method: PaymentMethod,
    amount: &str,
    at: DateTime<Tz>,
) -> Result<()> {
    service.submit_at(&form(client, method, amount), at)?;
    Ok(())
}

/// Append a row straight to the store, bypassing validation
pub fn append_raw(
    service: &LedgerService,
    timestamp: &str,
    client: &str,
    method: &str,
    amount: Option<f64>,
) -> Result<()> {
    service
        .store()
        .append(StoredRow::new(timestamp, client, method, amount))
}

pub fn row_count(service: &LedgerService) -> Result<usize> {
    Ok(service.store().load_all()?.len())
}
