//! Ledger contract and the in-memory ledger.

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use coinledger_common::{
    ensure_positive, next_timestamp, Result, Timestamp, Transaction, TransactionType,
};

use crate::balance;
use crate::journal::Journal;

/// Operations every ledger strategy provides.
///
/// Mutations are all-or-nothing: a rejected call leaves balance and log
/// exactly as they were. Implementations serialize `deposit`, `withdraw` and
/// `record` against each other so the sufficiency check of a withdrawal and
/// its append happen as one step.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Append a deposit of `amount`, stamped now.
    async fn deposit(&self, amount: Decimal) -> Result<Transaction>;

    /// Append a withdrawal of `amount`, stamped now, if the balance covers it.
    async fn withdraw(&self, amount: Decimal) -> Result<Transaction>;

    /// Append a transaction built by the caller (imports, back-dated entries).
    async fn record(&self, transaction: Transaction) -> Result<Transaction>;

    /// Balance over the whole log, or over the transactions at or after
    /// `as_of`.
    async fn balance(&self, as_of: Option<Timestamp>) -> Result<Decimal>;

    /// Snapshot of the log, newest first.
    async fn transactions(&self) -> Result<Vec<Transaction>>;

    /// Balance over the whole log.
    async fn current_balance(&self) -> Result<Decimal> {
        self.balance(None).await
    }

    /// Number of recorded transactions.
    async fn transaction_count(&self) -> Result<usize> {
        Ok(self.transactions().await?.len())
    }

    /// Short name of the storage strategy, for logs and health output.
    fn strategy(&self) -> &'static str;
}

/// Ledger held entirely in process memory.
///
/// A single reader-writer lock guards the journal. Writers hold it for the
/// whole check-and-append; readers never see an entry without its effect on
/// the balance.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    journal: RwLock<Journal>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger preloaded with history, validating it in order.
    pub fn from_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Result<Self> {
        Ok(Self {
            journal: RwLock::new(Journal::from_transactions(transactions)?),
        })
    }

    fn append_now(&self, kind: TransactionType, amount: Decimal) -> Result<Transaction> {
        let amount = ensure_positive(amount).map_err(|e| {
            warn!(amount = %amount, kind = %kind, "Rejected non-positive amount");
            e
        })?;

        let mut journal = self.journal.write();
        let tx = Transaction::new(kind, amount, next_timestamp(journal.latest_timestamp()));

        match journal.append(tx).cloned() {
            Ok(tx) => {
                info!(
                    transaction_id = %tx.id,
                    kind = %tx.kind,
                    amount = %tx.amount,
                    balance = %journal.balance(),
                    "Transaction recorded"
                );
                Ok(tx)
            }
            Err(e) => {
                warn!(
                    amount = %amount,
                    kind = %kind,
                    balance = %journal.balance(),
                    error = %e,
                    "Transaction rejected"
                );
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    #[instrument(skip(self))]
    async fn deposit(&self, amount: Decimal) -> Result<Transaction> {
        self.append_now(TransactionType::Deposit, amount)
    }

    #[instrument(skip(self))]
    async fn withdraw(&self, amount: Decimal) -> Result<Transaction> {
        self.append_now(TransactionType::Withdrawal, amount)
    }

    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id))]
    async fn record(&self, transaction: Transaction) -> Result<Transaction> {
        let mut journal = self.journal.write();
        let tx = journal.append(transaction)?.clone();

        info!(
            transaction_id = %tx.id,
            kind = %tx.kind,
            amount = %tx.amount,
            timestamp = %tx.timestamp,
            "Transaction imported"
        );
        Ok(tx)
    }

    async fn balance(&self, as_of: Option<Timestamp>) -> Result<Decimal> {
        let journal = self.journal.read();
        match as_of {
            None => Ok(journal.balance()),
            Some(_) => balance::balance_as_of(journal.entries(), as_of),
        }
    }

    async fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.journal.read().newest_first())
    }

    async fn transaction_count(&self) -> Result<usize> {
        Ok(self.journal.read().len())
    }

    fn strategy(&self) -> &'static str {
        "memory"
    }
}
