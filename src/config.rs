use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub use crate::domain::MonthScope;

/// Default ledger file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "peluqueria.xlsx";

/// Civil timezone used for timestamps and for "today" / "this month".
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Argentina::Buenos_Aires;

/// Everything the ledger service needs to know about its environment.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub store_path: PathBuf,
    pub timezone: Tz,
    pub month_scope: MonthScope,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            timezone: DEFAULT_TIMEZONE,
            month_scope: MonthScope::default(),
        }
    }
}

impl LedgerConfig {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            ..Self::default()
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_month_scope(mut self, month_scope: MonthScope) -> Self {
        self.month_scope = month_scope;
        self
    }

    /// Current instant in the configured timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}

/// Parse an IANA timezone name such as `America/Argentina/Buenos_Aires`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow!("Unknown timezone '{}': {}", name, e))
}
