//! Balance queries over a transaction log.

use coinledger_common::{LedgerError, Result, Timestamp, Transaction};
use rust_decimal::Decimal;

/// Signed sum of the transactions that fall inside the query window.
///
/// Without a cutoff every transaction counts. With a cutoff only transactions
/// timestamped at or after it count; a transaction exactly at the cutoff is
/// included.
pub fn balance_as_of<'a, I>(transactions: I, as_of: Option<Timestamp>) -> Result<Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|tx| within_cutoff(tx, as_of))
        .try_fold(Decimal::ZERO, apply)
}

/// Balance after applying `tx` to `balance`, or `BalanceOverflow`.
pub fn apply(balance: Decimal, tx: &Transaction) -> Result<Decimal> {
    balance
        .checked_add(tx.signed_amount())
        .ok_or(LedgerError::BalanceOverflow {
            kind: tx.kind,
            amount: tx.amount,
        })
}

/// Signed sum of the whole log.
pub fn total<'a, I>(transactions: I) -> Result<Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    balance_as_of(transactions, None)
}

fn within_cutoff(tx: &Transaction, as_of: Option<Timestamp>) -> bool {
    as_of.map_or(true, |cutoff| tx.timestamp >= cutoff)
}
