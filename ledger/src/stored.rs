//! Ledger backed by a transaction store.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use coinledger_common::{
    ensure_positive, next_timestamp, LedgerError, Result, Timestamp, Transaction, TransactionType,
};

use crate::balance;
use crate::engine::Ledger;
use crate::journal::validate_append;
use crate::store::TransactionStore;

/// Ledger whose log lives in a [`TransactionStore`].
///
/// No running total is kept: every balance is recomputed from the records the
/// store returns. Mutations queue on an async mutex that is held across the
/// scan, the checks and the insert, so two withdrawals can never both be
/// checked against the same balance.
pub struct StoredLedger<S> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: TransactionStore> StoredLedger<S> {
    /// Create a ledger over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check `tx` against `records`, the stored log as loaded under the
    /// write lock, and insert it.
    async fn append_checked(&self, tx: Transaction, records: &[Transaction]) -> Result<Transaction> {
        let current = balance::total(records)?;
        let after = validate_append(&tx, current, records.last().map(|last| last.timestamp))?;

        self.store.insert(&tx).await?;

        info!(
            store = self.store.name(),
            transaction_id = %tx.id,
            kind = %tx.kind,
            amount = %tx.amount,
            balance = %after,
            "Transaction stored"
        );
        Ok(tx)
    }

    async fn append_now(&self, kind: TransactionType, amount: Decimal) -> Result<Transaction> {
        let amount = ensure_positive(amount).map_err(|e| {
            warn!(amount = %amount, kind = %kind, "Rejected non-positive amount");
            e
        })?;

        let _guard = self.write_lock.lock().await;
        let records = self.store.load_all().await?;
        let latest = records.last().map(|last| last.timestamp);
        let tx = Transaction::new(kind, amount, next_timestamp(latest));

        self.append_checked(tx, &records).await.map_err(|e| {
            warn!(amount = %amount, kind = %kind, error = %e, "Transaction rejected");
            e
        })
    }
}

#[async_trait]
impl<S: TransactionStore> Ledger for StoredLedger<S> {
    #[instrument(skip(self))]
    async fn deposit(&self, amount: Decimal) -> Result<Transaction> {
        self.append_now(TransactionType::Deposit, amount).await
    }

    #[instrument(skip(self))]
    async fn withdraw(&self, amount: Decimal) -> Result<Transaction> {
        self.append_now(TransactionType::Withdrawal, amount).await
    }

    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id))]
    async fn record(&self, transaction: Transaction) -> Result<Transaction> {
        let _guard = self.write_lock.lock().await;
        if self.store.get(&transaction.id).await?.is_some() {
            return Err(LedgerError::DuplicateTransaction(transaction.id));
        }

        let records = self.store.load_all().await?;
        self.append_checked(transaction, &records).await
    }

    async fn balance(&self, as_of: Option<Timestamp>) -> Result<Decimal> {
        let records = self.store.load_all().await?;
        balance::balance_as_of(&records, as_of)
    }

    async fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut records = self.store.load_all().await?;
        records.reverse();
        Ok(records)
    }

    fn strategy(&self) -> &'static str {
        self.store.name()
    }
}
