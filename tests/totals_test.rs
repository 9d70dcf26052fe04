mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use salon_ledger::config::MonthScope;
use salon_ledger::domain::{PaymentMethod, RowError};

use common::{append_raw, ba, pay, test_service, test_service_with};

#[test]
fn test_totals_example_day() -> Result<()> {
    let (service, _temp) = test_service()?;
    let now = ba(2024, 5, 10, 19, 0, 0);

    pay(&service, "Ana", PaymentMethod::Cash, "1000", ba(2024, 5, 10, 10, 0, 0))?;
    pay(&service, "Luz", PaymentMethod::Transfer, "500", ba(2024, 5, 10, 11, 0, 0))?;
    pay(&service, "Sol", PaymentMethod::Cash, "300", ba(2024, 4, 22, 15, 0, 0))?;

    assert_eq!(service.daily_total_at(PaymentMethod::Cash, now)?, 1000.0);
    assert_eq!(service.daily_total_at(PaymentMethod::Transfer, now)?, 500.0);
    assert_eq!(service.monthly_total_at(now)?, 1500.0);

    let summary = service.summary_at(now)?;
    assert_eq!(summary.cash_today, 1000.0);
    assert_eq!(summary.transfer_today, 500.0);
    assert_eq!(summary.month_total, 1500.0);
    assert_eq!(summary.skipped_rows, 0);
    assert_eq!(summary.daily_line(), "Cash: $1000.00 | Transfer: $500.00");
    assert_eq!(summary.monthly_line(), "Monthly total: $1500.00");

    Ok(())
}

#[test]
fn test_yesterday_never_counts_today() -> Result<()> {
    let (service, _temp) = test_service()?;
    let now = ba(2024, 5, 10, 0, 0, 1);

    pay(&service, "Ana", PaymentMethod::Cash, "99999", ba(2024, 5, 9, 23, 59, 59))?;
    pay(&service, "Luz", PaymentMethod::Cash, "10", now)?;

    assert_eq!(service.daily_total_at(PaymentMethod::Cash, now)?, 10.0);
    // Same month, so the monthly total still includes yesterday
    assert_eq!(service.monthly_total_at(now)?, 100009.0);

    Ok(())
}

#[test]
fn test_today_is_the_civil_date_in_the_configured_timezone() -> Result<()> {
    let (service, _temp) = test_service()?;

    // 02:30 UTC on May 11 is still May 10 in Buenos Aires (UTC-3)
    let instant = Utc
        .with_ymd_and_hms(2024, 5, 11, 2, 30, 0)
        .unwrap()
        .with_timezone(&service.config().timezone);
    let record = service.submit_at(&common::form("Ana", PaymentMethod::Cash, "100"), instant)?;

    assert_eq!(record.timestamp, ba(2024, 5, 10, 23, 30, 0).naive_local());
    assert_eq!(
        service.daily_total_at(PaymentMethod::Cash, ba(2024, 5, 10, 23, 45, 0))?,
        100.0
    );
    assert_eq!(
        service.daily_total_at(PaymentMethod::Cash, ba(2024, 5, 11, 8, 0, 0))?,
        0.0
    );

    Ok(())
}

#[test]
fn test_unparseable_rows_are_skipped() -> Result<()> {
    let (service, _temp) = test_service()?;
    let now = ba(2024, 5, 10, 19, 0, 0);

    pay(&service, "Ana", PaymentMethod::Cash, "1000", ba(2024, 5, 10, 10, 0, 0))?;
    append_raw(&service, "2024-05-10 11:00:00", "Iso", "Efectivo", Some(5000.0))?;
    append_raw(&service, "ayer", "Text", "Transferencia", Some(700.0))?;
    append_raw(&service, "10/05/2024 12:00:00", "Card", "Tarjeta", Some(40.0))?;
    append_raw(&service, "10/05/2024 13:00:00", "Blank", "Efectivo", None)?;
    pay(&service, "Luz", PaymentMethod::Transfer, "500", ba(2024, 5, 10, 14, 0, 0))?;

    let loaded = service.load()?;
    assert_eq!(loaded.entries.len(), 2);
    assert_eq!(loaded.issues.len(), 4);
    assert_eq!(
        loaded.issues.iter().map(|i| i.line).collect::<Vec<_>>(),
        vec![3, 4, 5, 6]
    );
    assert_eq!(
        loaded.issues[0].error,
        RowError::TimestampParse("2024-05-10 11:00:00".to_string())
    );
    assert_eq!(
        loaded.issues[2].error,
        RowError::UnknownPaymentMethod("Tarjeta".to_string())
    );
    assert_eq!(loaded.issues[3].error, RowError::MissingAmount);

    let summary = service.summary_at(now)?;
    assert_eq!(summary.cash_today, 1000.0);
    assert_eq!(summary.transfer_today, 500.0);
    assert_eq!(summary.month_total, 1500.0);
    assert_eq!(summary.skipped_rows, 4);

    Ok(())
}

#[test]
fn test_monthly_total_ignores_year_by_default() -> Result<()> {
    let (service, _temp) = test_service()?;
    let now = ba(2024, 5, 10, 19, 0, 0);

    pay(&service, "Ana", PaymentMethod::Cash, "1000", ba(2024, 5, 2, 10, 0, 0))?;
    pay(&service, "Old", PaymentMethod::Transfer, "250", ba(2023, 5, 20, 10, 0, 0))?;
    pay(&service, "Apr", PaymentMethod::Cash, "75", ba(2024, 4, 30, 10, 0, 0))?;

    assert_eq!(service.config().month_scope, MonthScope::MonthOfYear);
    assert_eq!(service.monthly_total_at(now)?, 1250.0);

    Ok(())
}

#[test]
fn test_calendar_month_scope_requires_same_year() -> Result<()> {
    let (service, _temp) =
        test_service_with(|config| config.with_month_scope(MonthScope::CalendarMonth))?;
    let now = ba(2024, 5, 10, 19, 0, 0);

    pay(&service, "Ana", PaymentMethod::Cash, "1000", ba(2024, 5, 2, 10, 0, 0))?;
    pay(&service, "Old", PaymentMethod::Transfer, "250", ba(2023, 5, 20, 10, 0, 0))?;

    assert_eq!(service.monthly_total_at(now)?, 1000.0);
    assert_eq!(
        service.summary_at(now)?.month_scope,
        MonthScope::CalendarMonth
    );

    Ok(())
}

#[test]
fn test_empty_ledger_totals() -> Result<()> {
    let (service, _temp) = test_service()?;
    let summary = service.summary_at(ba(2024, 5, 10, 12, 0, 0))?;

    assert_eq!(summary.daily_line(), "Cash: $0.00 | Transfer: $0.00");
    assert_eq!(summary.monthly_line(), "Monthly total: $0.00");

    Ok(())
}

#[test]
fn test_summary_serializes_to_json() -> Result<()> {
    let (service, _temp) = test_service()?;
    let now = ba(2024, 5, 10, 12, 0, 0);
    pay(&service, "Ana", PaymentMethod::Cash, "120.5", now)?;

    let json = serde_json::to_value(service.summary_at(now)?)?;
    assert_eq!(json["date"], "2024-05-10");
    assert_eq!(json["cash_today"], 120.5);
    assert_eq!(json["month_scope"], "month_of_year");

    Ok(())
}
