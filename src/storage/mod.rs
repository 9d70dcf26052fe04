mod xlsx;

pub use xlsx::*;

use anyhow::Result;

use crate::domain::StoredRow;

/// Access to the durable copy of the ledger.
///
/// Every interaction reloads the whole ledger; there is no incremental state
/// between calls and no locking, so a store must only ever have one writer.
pub trait LedgerStore {
    /// Create an empty ledger if none exists yet. Returns true when it was created.
    fn ensure_exists(&self) -> Result<bool>;

    /// Read every row, in insertion order.
    fn load_all(&self) -> Result<Vec<StoredRow>>;

    /// Replace the stored ledger with `rows`.
    fn save_all(&self, rows: &[StoredRow]) -> Result<()>;

    /// Persist one more row after the existing ones.
    fn append(&self, row: StoredRow) -> Result<()> {
        let mut rows = self.load_all()?;
        rows.push(row);
        self.save_all(&rows)
    }

    /// The stored ledger exactly as persisted.
    fn raw_bytes(&self) -> Result<Vec<u8>>;

    /// Human-readable location, for messages.
    fn location(&self) -> String;
}
