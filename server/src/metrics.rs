//! Metrics collection for service monitoring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use coinledger_common::LedgerError;

/// Ledger service metrics.
pub struct Metrics {
    /// Accepted deposits.
    pub deposits_total: AtomicU64,
    /// Accepted withdrawals.
    pub withdrawals_total: AtomicU64,
    /// Requests rejected for a non-positive or missing amount.
    pub rejected_invalid_amount: AtomicU64,
    /// Withdrawals rejected for insufficient balance.
    pub rejected_insufficient_balance: AtomicU64,
    /// Mutations rejected for any other ledger rule (duplicate id, out of
    /// order, balance range).
    pub rejected_other: AtomicU64,
    /// Storage failures.
    pub storage_errors: AtomicU64,
    /// Balance queries served.
    pub balance_queries: AtomicU64,
}

impl Metrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            deposits_total: AtomicU64::new(0),
            withdrawals_total: AtomicU64::new(0),
            rejected_invalid_amount: AtomicU64::new(0),
            rejected_insufficient_balance: AtomicU64::new(0),
            rejected_other: AtomicU64::new(0),
            storage_errors: AtomicU64::new(0),
            balance_queries: AtomicU64::new(0),
        }
    }

    /// Record an accepted deposit.
    pub fn deposit_accepted(&self) {
        self.deposits_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted withdrawal.
    pub fn withdrawal_accepted(&self) {
        self.withdrawals_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an amount that failed validation before reaching the ledger.
    pub fn invalid_amount(&self) {
        self.rejected_invalid_amount.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed ledger operation.
    pub fn operation_failed(&self, error: &LedgerError) {
        let counter = match error {
            LedgerError::InvalidAmount { .. } => &self.rejected_invalid_amount,
            LedgerError::InsufficientBalance { .. } => &self.rejected_insufficient_balance,
            LedgerError::Storage(_) => &self.storage_errors,
            LedgerError::BalanceOverflow { .. }
            | LedgerError::OutOfOrder { .. }
            | LedgerError::DuplicateTransaction(_) => &self.rejected_other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a balance query.
    pub fn balance_queried(&self) {
        self.balance_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            deposits_total: self.deposits_total.load(Ordering::Relaxed),
            withdrawals_total: self.withdrawals_total.load(Ordering::Relaxed),
            rejected_invalid_amount: self.rejected_invalid_amount.load(Ordering::Relaxed),
            rejected_insufficient_balance: self
                .rejected_insufficient_balance
                .load(Ordering::Relaxed),
            rejected_other: self.rejected_other.load(Ordering::Relaxed),
            storage_errors: self.storage_errors.load(Ordering::Relaxed),
            balance_queries: self.balance_queries.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            r#"# HELP coinledger_deposits_total Accepted deposits
# TYPE coinledger_deposits_total counter
coinledger_deposits_total {}

# HELP coinledger_withdrawals_total Accepted withdrawals
# TYPE coinledger_withdrawals_total counter
coinledger_withdrawals_total {}

# HELP coinledger_rejected_total Rejected mutations by reason
# TYPE coinledger_rejected_total counter
coinledger_rejected_total{{reason="invalid_amount"}} {}
coinledger_rejected_total{{reason="insufficient_balance"}} {}
coinledger_rejected_total{{reason="other"}} {}

# HELP coinledger_storage_errors_total Storage failures
# TYPE coinledger_storage_errors_total counter
coinledger_storage_errors_total {}

# HELP coinledger_balance_queries_total Balance queries served
# TYPE coinledger_balance_queries_total counter
coinledger_balance_queries_total {}
"#,
            snapshot.deposits_total,
            snapshot.withdrawals_total,
            snapshot.rejected_invalid_amount,
            snapshot.rejected_insufficient_balance,
            snapshot.rejected_other,
            snapshot.storage_errors,
            snapshot.balance_queries,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub deposits_total: u64,
    pub withdrawals_total: u64,
    pub rejected_invalid_amount: u64,
    pub rejected_insufficient_balance: u64,
    pub rejected_other: u64,
    pub storage_errors: u64,
    pub balance_queries: u64,
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<Metrics>;
