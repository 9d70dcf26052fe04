use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{format_amount, MonthScope, PaymentMethod};

/// Totals shown under the payment form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub date: NaiveDate,
    pub cash_today: f64,
    pub transfer_today: f64,
    pub month_total: f64,
    pub month_scope: MonthScope,
    /// Rows left out of every total because they failed validation
    pub skipped_rows: usize,
}

impl Summary {
    pub fn today(&self, method: PaymentMethod) -> f64 {
        match method {
            PaymentMethod::Cash => self.cash_today,
            PaymentMethod::Transfer => self.transfer_today,
        }
    }

    /// "Cash: $1000.00 | Transfer: $500.00"
    pub fn daily_line(&self) -> String {
        format!(
            "Cash: {} | Transfer: {}",
            format_amount(self.cash_today),
            format_amount(self.transfer_today)
        )
    }

    pub fn monthly_line(&self) -> String {
        format!("Monthly total: {}", format_amount(self.month_total))
    }
}
