//! PostgreSQL transaction store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use coinledger_common::{LedgerError, Result, Transaction, TransactionId, TransactionType};

use crate::store::TransactionStore;

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    seq         BIGSERIAL   NOT NULL UNIQUE,
    id          UUID        PRIMARY KEY,
    kind        TEXT        NOT NULL CHECK (kind IN ('DEPOSIT', 'WITHDRAWAL')),
    amount      NUMERIC     NOT NULL CHECK (amount > 0),
    recorded_at TIMESTAMPTZ NOT NULL
)";

const INSERT: &str =
    "INSERT INTO transactions (id, kind, amount, recorded_at) VALUES ($1, $2, $3, $4)";

const SELECT_ALL: &str = "SELECT id, kind, amount, recorded_at FROM transactions ORDER BY seq";

const SELECT_ONE: &str = "SELECT id, kind, amount, recorded_at FROM transactions WHERE id = $1";

/// Transaction store on a PostgreSQL `transactions` table.
///
/// Insertion order is kept by the `seq` column, so records stamped with the
/// same timestamp come back in the order they were written.
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(storage_error)?;

        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Create the `transactions` table if it does not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn insert(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(INSERT)
            .bind(*transaction.id.as_uuid())
            .bind(transaction.kind.as_str())
            .bind(transaction.amount)
            .bind(transaction.timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                    LedgerError::DuplicateTransaction(transaction.id)
                } else {
                    storage_error(e)
                }
            })?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn get(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(SELECT_ONE)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(transaction_from_row).transpose()
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction> {
    let id: Uuid = row.try_get("id").map_err(storage_error)?;
    let kind: String = row.try_get("kind").map_err(storage_error)?;
    let amount: Decimal = row.try_get("amount").map_err(storage_error)?;
    let timestamp: DateTime<Utc> = row.try_get("recorded_at").map_err(storage_error)?;

    let kind = kind
        .parse::<TransactionType>()
        .map_err(|e| LedgerError::Storage(e.to_string()))?;

    Ok(Transaction {
        id: TransactionId::from_uuid(id),
        kind,
        amount,
        timestamp,
    })
}

fn storage_error(e: sqlx::Error) -> LedgerError {
    LedgerError::Storage(e.to_string())
}
