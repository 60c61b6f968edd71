//! Persistence adapter for transaction records.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;

use coinledger_common::{LedgerError, Result, Transaction, TransactionId};

/// Durable home for transaction records, keyed by ID.
///
/// Stores only insert and read back. They apply no ledger rules beyond
/// refusing a second record with the same ID; the balance and ordering rules
/// live in the ledger that owns the store.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist a new record. The record is durable once this returns `Ok`.
    async fn insert(&self, transaction: &Transaction) -> Result<()>;

    /// Every record, in insertion order.
    async fn load_all(&self) -> Result<Vec<Transaction>>;

    /// Look up a record by ID.
    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>>;

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Store kept in process memory. Used in tests and for running the
/// store-backed ledger without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Transaction>>,
    index: DashMap<TransactionId, usize>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert(&self, transaction: &Transaction) -> Result<()> {
        let mut records = self.records.write();
        if self.index.contains_key(&transaction.id) {
            return Err(LedgerError::DuplicateTransaction(transaction.id));
        }

        self.index.insert(transaction.id, records.len());
        records.push(transaction.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Transaction>> {
        Ok(self.records.read().clone())
    }

    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        let records = self.records.read();
        Ok(self
            .index
            .get(id)
            .and_then(|position| records.get(*position).cloned()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
