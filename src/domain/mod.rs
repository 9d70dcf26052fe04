mod cell;
mod ledger;
mod money;
mod payment;

pub use cell::*;
pub use ledger::*;
pub use money::*;
pub use payment::*;
