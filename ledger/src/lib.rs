//! CoinLedger Ledger Engine
//!
//! Append-only transaction log with a derived balance. Two strategies
//! implement the same [`Ledger`] contract: [`InMemoryLedger`] keeps a running
//! total next to the log, [`StoredLedger`] recomputes the balance from the
//! records held by a [`TransactionStore`].

pub mod engine;
pub mod journal;
pub mod balance;
pub mod store;
pub mod stored;
pub mod postgres;

pub use engine::{InMemoryLedger, Ledger};
pub use journal::Journal;
pub use store::{MemoryStore, TransactionStore};
pub use stored::StoredLedger;
pub use postgres::PgTransactionStore;
