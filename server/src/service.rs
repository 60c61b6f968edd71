//! Ledger service: the ledger plus the bookkeeping around it.

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use coinledger_common::{Result, Timestamp, Transaction};
use coinledger_ledger::{InMemoryLedger, Ledger, PgTransactionStore, StoredLedger};

use crate::config::{StorageConfig, StorageKind};
use crate::metrics::{Metrics, SharedMetrics};
use crate::state::ServiceState;

/// Open the ledger strategy named by `config`.
pub async fn open_ledger(config: &StorageConfig) -> Result<Arc<dyn Ledger>> {
    let ledger: Arc<dyn Ledger> = match config.kind {
        StorageKind::Memory => Arc::new(InMemoryLedger::new()),
        StorageKind::Postgres => {
            let store =
                PgTransactionStore::connect(&config.database_url, config.max_connections).await?;
            store.migrate().await?;
            Arc::new(StoredLedger::new(store))
        }
    };

    info!(strategy = ledger.strategy(), "Ledger opened");
    Ok(ledger)
}

/// The running service.
pub struct LedgerService {
    ledger: Arc<dyn Ledger>,
    metrics: SharedMetrics,
    state: RwLock<ServiceState>,
}

impl LedgerService {
    /// Create a service around an opened ledger.
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            metrics: Arc::new(Metrics::new()),
            state: RwLock::new(ServiceState::Starting),
        }
    }

    /// Mark the service as accepting requests.
    pub fn start(&self) {
        *self.state.write() = ServiceState::Running;
        info!(strategy = self.ledger.strategy(), "Ledger service running");
    }

    /// Mark the service as draining, then stopped.
    pub fn stop(&self) {
        *self.state.write() = ServiceState::ShuttingDown;
        info!("Ledger service shutting down");
        *self.state.write() = ServiceState::Stopped;
    }

    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    #[instrument(skip(self))]
    pub async fn deposit(&self, amount: Decimal) -> Result<Transaction> {
        let result = self.ledger.deposit(amount).await;
        match &result {
            Ok(_) => self.metrics.deposit_accepted(),
            Err(e) => self.metrics.operation_failed(e),
        }
        result
    }

    #[instrument(skip(self))]
    pub async fn withdraw(&self, amount: Decimal) -> Result<Transaction> {
        let result = self.ledger.withdraw(amount).await;
        match &result {
            Ok(_) => self.metrics.withdrawal_accepted(),
            Err(e) => self.metrics.operation_failed(e),
        }
        result
    }

    pub async fn balance(&self, as_of: Option<Timestamp>) -> Result<Decimal> {
        self.metrics.balance_queried();
        self.ledger.balance(as_of).await.map_err(|e| {
            self.metrics.operation_failed(&e);
            e
        })
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.ledger.transactions().await.map_err(|e| {
            self.metrics.operation_failed(&e);
            e
        })
    }
}
