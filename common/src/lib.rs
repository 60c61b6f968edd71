//! CoinLedger Common Types
//!
//! This crate contains the types shared by the ledger engine and the service
//! around it: the immutable transaction record, amount validation, errors and
//! time helpers.

pub mod identifiers;
pub mod monetary;
pub mod transaction;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use monetary::*;
pub use transaction::*;
pub use error::*;
pub use time::*;
