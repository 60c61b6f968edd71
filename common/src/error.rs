//! Error types for ledger operations.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Timestamp, TransactionId, TransactionType};

/// Main error type for ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is not strictly positive.
    #[error("Amount must be positive")]
    InvalidAmount { amount: Decimal },

    /// Withdrawal exceeds the balance available when it was evaluated.
    #[error("Insufficient balance to withdraw {requested}")]
    InsufficientBalance { requested: Decimal },

    /// Applying the transaction would take the balance outside the range a
    /// `Decimal` can hold.
    #[error("Balance out of range after {kind} of {amount}")]
    BalanceOverflow { kind: TransactionType, amount: Decimal },

    /// Recorded transaction is older than the newest one in the log.
    #[error("Transaction at {timestamp} precedes the latest recorded transaction at {latest}")]
    OutOfOrder {
        timestamp: Timestamp,
        latest: Timestamp,
    },

    /// A transaction with this ID is already in the log.
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(TransactionId),

    /// Persistence layer failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Check if this error is a rejection of the request itself rather than
    /// an infrastructure failure. Rejections leave the ledger untouched and
    /// must not be retried unchanged.
    pub fn is_domain_rejection(&self) -> bool {
        !matches!(self, LedgerError::Storage(_))
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount { .. } => "INVALID_AMOUNT",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
            LedgerError::OutOfOrder { .. } => "OUT_OF_ORDER",
            LedgerError::DuplicateTransaction(_) => "DUPLICATE_TRANSACTION",
            LedgerError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::InsufficientBalance {
            requested: Decimal::from(999),
        };
        assert_eq!(err.to_string(), "Insufficient balance to withdraw 999");

        let err = LedgerError::InvalidAmount {
            amount: Decimal::from(-5),
        };
        assert_eq!(err.to_string(), "Amount must be positive");
    }

    #[test]
    fn test_domain_rejection() {
        assert!(LedgerError::InvalidAmount {
            amount: Decimal::ZERO
        }
        .is_domain_rejection());
        assert!(LedgerError::DuplicateTransaction(TransactionId::new()).is_domain_rejection());
        assert!(!LedgerError::Storage("connection reset".into()).is_domain_rejection());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientBalance {
                requested: Decimal::ONE
            }
            .error_code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(
            LedgerError::BalanceOverflow {
                kind: TransactionType::Deposit,
                amount: Decimal::MAX
            }
            .error_code(),
            "BALANCE_OVERFLOW"
        );
        assert_eq!(
            LedgerError::Storage(String::new()).error_code(),
            "STORAGE_ERROR"
        );
    }
}
