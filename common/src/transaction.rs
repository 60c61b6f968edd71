//! The immutable transaction record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Timestamp, TransactionId};

/// Kind of monetary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money coming in; increases the balance.
    Deposit,
    /// Money going out; decreases the balance.
    Withdrawal,
}

impl TransactionType {
    /// Stable name used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored transaction type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransactionType(pub String);

impl fmt::Display for UnknownTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown transaction type: {}", self.0)
    }
}

impl std::error::Error for UnknownTransactionType {}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

/// A single recorded deposit or withdrawal.
///
/// Records are values: they are created once, appended to the log and never
/// changed. The magnitude is always positive; the direction comes from
/// [`TransactionType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID.
    pub id: TransactionId,
    /// Deposit or withdrawal.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Magnitude of the movement.
    pub amount: Decimal,
    /// When the transaction was recorded.
    pub timestamp: Timestamp,
}

impl Transaction {
    /// Create a transaction with a fresh ID.
    pub fn new(kind: TransactionType, amount: Decimal, timestamp: Timestamp) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            timestamp,
        }
    }

    /// Create a deposit.
    pub fn deposit(amount: Decimal, timestamp: Timestamp) -> Self {
        Self::new(TransactionType::Deposit, amount, timestamp)
    }

    /// Create a withdrawal.
    pub fn withdrawal(amount: Decimal, timestamp: Timestamp) -> Self {
        Self::new(TransactionType::Withdrawal, amount, timestamp)
    }

    /// Contribution to the balance: positive for deposits, negative for
    /// withdrawals.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Deposit => self.amount,
            TransactionType::Withdrawal => -self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::start_of_day;

    #[test]
    fn test_signed_amount() {
        let at = start_of_day(2020, 1, 10).unwrap();

        assert_eq!(
            Transaction::deposit(Decimal::from(30), at).signed_amount(),
            Decimal::from(30)
        );
        assert_eq!(
            Transaction::withdrawal(Decimal::from(10), at).signed_amount(),
            Decimal::from(-10)
        );
    }

    #[test]
    fn test_transaction_type_names() {
        for kind in [TransactionType::Deposit, TransactionType::Withdrawal] {
            assert_eq!(kind.as_str().parse::<TransactionType>().unwrap(), kind);
        }
        assert!("TRANSFER".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_json_shape() {
        let at = start_of_day(2020, 1, 31).unwrap();
        let tx = Transaction::withdrawal(Decimal::new(1050, 2), at);

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["id"], tx.id.to_string());
        assert_eq!(json["type"], "WITHDRAWAL");
        assert_eq!(json["amount"], "10.50");
        assert_eq!(json["timestamp"], "2020-01-31T00:00:00Z");
    }
}
