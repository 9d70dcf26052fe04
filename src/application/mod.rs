// Application layer - use cases over the ledger store.
// Clients (the CLI, tests) talk to LedgerService and never to the store directly.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
