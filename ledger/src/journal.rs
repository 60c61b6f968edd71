//! Append-only transaction journal with a running balance.

use std::collections::HashSet;

use coinledger_common::{
    ensure_positive, LedgerError, Result, Timestamp, Transaction, TransactionId, TransactionType,
};
use rust_decimal::Decimal;

/// Check whether `tx` may be appended to a log whose current balance is
/// `balance` and whose newest record is stamped `latest`, returning the
/// balance after the append.
///
/// Shared by both ledger strategies so the rules cannot drift apart.
pub fn validate_append(
    tx: &Transaction,
    balance: Decimal,
    latest: Option<Timestamp>,
) -> Result<Decimal> {
    ensure_positive(tx.amount)?;

    if tx.kind == TransactionType::Withdrawal && tx.amount > balance {
        return Err(LedgerError::InsufficientBalance {
            requested: tx.amount,
        });
    }

    if let Some(latest) = latest {
        if tx.timestamp < latest {
            return Err(LedgerError::OutOfOrder {
                timestamp: tx.timestamp,
                latest,
            });
        }
    }

    crate::balance::apply(balance, tx)
}

/// Ordered log of transactions plus the balance they add up to.
///
/// Entries and balance change together in [`Journal::append`], so a reader
/// holding `&Journal` always sees them agree.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<Transaction>,
    ids: HashSet<TransactionId>,
    balance: Decimal,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a journal from previously recorded transactions, re-checking
    /// every record in order.
    pub fn from_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Result<Self> {
        let mut journal = Self::new();
        for tx in transactions {
            journal.append(tx)?;
        }
        Ok(journal)
    }

    /// Append a transaction. On error nothing changes.
    pub fn append(&mut self, tx: Transaction) -> Result<&Transaction> {
        if self.contains(&tx.id) {
            return Err(LedgerError::DuplicateTransaction(tx.id));
        }
        self.balance = validate_append(&tx, self.balance, self.latest_timestamp())?;
        self.ids.insert(tx.id);
        self.entries.push(tx);

        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Current balance.
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Timestamp of the newest entry.
    pub fn latest_timestamp(&self) -> Option<Timestamp> {
        self.entries.last().map(|tx| tx.timestamp)
    }

    /// Entries in recording order.
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    /// Copy of the entries, newest first.
    pub fn newest_first(&self) -> Vec<Transaction> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
