use chrono::{DateTime, NaiveDate, SubsecRound};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::domain::{
    daily_total, monthly_total, parse_amount, Ledger, LedgerEntry, PaymentMethod, PaymentRecord,
    RowIssue, StoredRow,
};
use crate::storage::{LedgerStore, XlsxStore};

use super::{AppError, Summary};

/// Application service providing the ledger's operations.
/// This is the primary interface for any client (CLI, tests, a future UI).
///
/// Nothing is cached between calls: every operation reloads the full ledger from the store.
pub struct LedgerService<S: LedgerStore = XlsxStore> {
    store: S,
    config: LedgerConfig,
}

/// What the payment form hands to the service, exactly as typed.
#[derive(Debug, Clone)]
pub struct PaymentForm {
    pub client: String,
    pub payment_method: PaymentMethod,
    pub amount: String,
}

impl PaymentForm {
    pub fn new(
        client: impl Into<String>,
        payment_method: PaymentMethod,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            client: client.into(),
            payment_method,
            amount: amount.into(),
        }
    }
}

/// The ledger as loaded for one interaction.
pub struct LoadedLedger {
    pub ledger: Ledger,
    pub entries: Vec<LedgerEntry>,
    pub issues: Vec<RowIssue>,
}

impl LoadedLedger {
    pub fn records(&self) -> impl Iterator<Item = &PaymentRecord> {
        self.entries.iter().map(|entry| &entry.record)
    }

    /// Stored rows of valid records dated `day`, in insertion order.
    pub fn rows_on(&self, day: NaiveDate) -> Vec<StoredRow> {
        self.entries
            .iter()
            .filter(|entry| entry.record.timestamp.date() == day)
            .map(|entry| self.ledger.rows()[entry.position].clone())
            .collect()
    }
}

impl LedgerService<XlsxStore> {
    /// Open the spreadsheet ledger named in `config`, creating it if needed.
    pub fn open(config: LedgerConfig) -> Result<Self, AppError> {
        let store = XlsxStore::new(config.store_path.clone());
        let service = Self::new(store, config);
        service.initialize()?;
        Ok(service)
    }
}

impl<S: LedgerStore> LedgerService<S> {
    /// Create a service over `store`. No I/O happens until an operation is called.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current instant in the ledger's timezone.
    pub fn now(&self) -> DateTime<Tz> {
        self.config.now()
    }

    /// Make sure the backing store exists. Safe to call on every start.
    /// Returns true when an empty ledger was just created.
    pub fn initialize(&self) -> Result<bool, AppError> {
        let created = self.store.ensure_exists()?;
        if created {
            info!(store = %self.store.location(), "initialized ledger");
        }
        Ok(created)
    }

    /// Reload the whole ledger. Invalid rows are reported, never fatal.
    pub fn load(&self) -> Result<LoadedLedger, AppError> {
        let ledger = Ledger::new(self.store.load_all()?);
        let (entries, issues) = ledger.entries();

        for issue in &issues {
            warn!(line = issue.line, error = %issue.error, "ignoring ledger row");
        }

        Ok(LoadedLedger {
            ledger,
            entries,
            issues,
        })
    }

    // ========================
    // Submission
    // ========================

    /// Record a payment taken now.
    pub fn submit(&self, form: &PaymentForm) -> Result<PaymentRecord, AppError> {
        self.submit_at(form, self.now())
    }

    /// Record a payment taken at `now`. The ledger is untouched unless this returns Ok.
    pub fn submit_at(
        &self,
        form: &PaymentForm,
        now: DateTime<Tz>,
    ) -> Result<PaymentRecord, AppError> {
        if form.client.is_empty() {
            return Err(AppError::MissingField("client"));
        }
        if form.amount.is_empty() {
            return Err(AppError::MissingField("amount"));
        }

        let amount =
            parse_amount(&form.amount).map_err(|e| AppError::InvalidAmount(e.to_string()))?;

        // The stored format has one-second resolution
        let timestamp = now.naive_local().trunc_subsecs(0);
        let record = PaymentRecord::new(timestamp, form.client.clone(), form.payment_method, amount);

        self.store.append(record.to_row())?;
        info!(
            client = %record.client,
            method = %record.payment_method,
            amount = record.amount,
            "recorded payment"
        );

        Ok(record)
    }

    // ========================
    // Totals
    // ========================

    /// Today's total for one payment method.
    pub fn daily_total_at(&self, method: PaymentMethod, now: DateTime<Tz>) -> Result<f64, AppError> {
        let loaded = self.load()?;
        Ok(daily_total(loaded.records(), method, now.date_naive()))
    }

    /// Total for the month of `now`, matched per the configured month scope.
    pub fn monthly_total_at(&self, now: DateTime<Tz>) -> Result<f64, AppError> {
        let loaded = self.load()?;
        Ok(monthly_total(
            loaded.records(),
            &now.naive_local(),
            self.config.month_scope,
        ))
    }

    pub fn summary(&self) -> Result<Summary, AppError> {
        self.summary_at(self.now())
    }

    /// Both daily totals and the monthly total from a single load.
    pub fn summary_at(&self, now: DateTime<Tz>) -> Result<Summary, AppError> {
        let loaded = self.load()?;
        let today = now.date_naive();

        Ok(Summary {
            date: today,
            cash_today: daily_total(loaded.records(), PaymentMethod::Cash, today),
            transfer_today: daily_total(loaded.records(), PaymentMethod::Transfer, today),
            month_total: monthly_total(
                loaded.records(),
                &now.naive_local(),
                self.config.month_scope,
            ),
            month_scope: self.config.month_scope,
            skipped_rows: loaded.issues.len(),
        })
    }
}
