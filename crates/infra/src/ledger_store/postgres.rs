//! Postgres-backed ledger store.
//!
//! Two tables realize the persisted layout: `stock_items` keyed by unique
//! `name`, and `history_entries`, append-only with a `BIGSERIAL` sequence
//! number. There is deliberately **no** foreign key between them — history
//! rows are denormalized facts that must survive item rename/removal.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Concurrent insert raced on the name key |
//! | Database (check constraint violation) | `23514` | `Corrupt` | Negative quantity reached the database |
//! | Database (other) | Any other | `Unavailable` | Other database errors |
//! | PoolClosed / Io / Tls | N/A | `Unavailable` | Backend unreachable |
//! | row decode failures | N/A | `Corrupt` | Row did not match the expected shape |

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use stockroom_core::{Action, HistoryEntry, HistoryRecord, StockItem};

use super::r#trait::{LedgerStore, StoreError};

/// Postgres-backed ledger store.
///
/// `commit` runs the stock upsert and the history append in one SQL
/// transaction, so readers see either both or neither. Uses the SQLx
/// connection pool, which is thread-safe and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create both tables if they don't exist yet.
    ///
    /// Called once at process startup, before the store is handed to the
    /// engine.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stock_items (
                name        TEXT PRIMARY KEY,
                quantity    BIGINT NOT NULL CHECK (quantity >= 0),
                category    TEXT NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema(stock_items)", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history_entries (
                seq         BIGSERIAL PRIMARY KEY,
                stock_name  TEXT NOT NULL,
                quantity    BIGINT NOT NULL CHECK (quantity > 0),
                person      TEXT NOT NULL,
                action      TEXT NOT NULL,
                occurred_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema(history_entries)", e))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self), err)]
    async fn fetch_item(&self, name: &str) -> Result<Option<StockItem>, StoreError> {
        let row = sqlx::query(
            "SELECT name, quantity, category, updated_at FROM stock_items WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_item", e))?;

        match row {
            Some(row) => {
                let item = StockItemRow::from_row(&row)
                    .map_err(|e| StoreError::Corrupt(format!("failed to decode stock row: {e}")))?;
                Ok(Some(item.into()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_items(&self) -> Result<Vec<StockItem>, StoreError> {
        let rows = sqlx::query(
            "SELECT name, quantity, category, updated_at FROM stock_items ORDER BY name ASC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let item = StockItemRow::from_row(&row)
                .map_err(|e| StoreError::Corrupt(format!("failed to decode stock row: {e}")))?;
            items.push(item.into());
        }
        Ok(items)
    }

    #[instrument(skip(self), err)]
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT seq, stock_name, quantity, person, action, occurred_at
            FROM history_entries
            ORDER BY occurred_at DESC, seq DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_history", e))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let entry = HistoryEntryRow::from_row(&row)
                .map_err(|e| StoreError::Corrupt(format!("failed to decode history row: {e}")))?;
            entries.push(entry.try_into()?);
        }
        Ok(entries)
    }

    #[instrument(skip(self), err)]
    async fn snapshot(&self) -> Result<(Vec<StockItem>, Vec<HistoryEntry>), StoreError> {
        // One repeatable-read transaction covers both selects, so the two
        // halves see the same committed state.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("snapshot(begin)", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("snapshot(isolation)", e))?;

        let item_rows = sqlx::query(
            "SELECT name, quantity, category, updated_at FROM stock_items ORDER BY name ASC",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("snapshot(items)", e))?;

        let history_rows = sqlx::query(
            r#"
            SELECT seq, stock_name, quantity, person, action, occurred_at
            FROM history_entries
            ORDER BY occurred_at DESC, seq DESC
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("snapshot(history)", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("snapshot(commit)", e))?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            let item = StockItemRow::from_row(&row)
                .map_err(|e| StoreError::Corrupt(format!("failed to decode stock row: {e}")))?;
            items.push(item.into());
        }

        let mut history = Vec::with_capacity(history_rows.len());
        for row in history_rows {
            let entry = HistoryEntryRow::from_row(&row)
                .map_err(|e| StoreError::Corrupt(format!("failed to decode history row: {e}")))?;
            history.push(entry.try_into()?);
        }

        Ok((items, history))
    }

    #[instrument(skip(self, item, record), fields(name = %item.name, action = %record.action), err)]
    async fn commit(
        &self,
        item: StockItem,
        record: HistoryRecord,
    ) -> Result<HistoryEntry, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO stock_items (name, quantity, category, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE
                SET quantity = EXCLUDED.quantity,
                    updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.category)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("commit(upsert)", e))?;

        let row = sqlx::query(
            r#"
            INSERT INTO history_entries (stock_name, quantity, person, action, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING seq
            "#,
        )
        .bind(&record.stock_name)
        .bind(record.quantity)
        .bind(&record.person)
        .bind(record.action.as_str())
        .bind(record.occurred_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("commit(append)", e))?;

        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| StoreError::Corrupt(format!("failed to read seq: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(record.into_entry(seq as u64))
    }
}

#[derive(Debug)]
struct StockItemRow {
    name: String,
    quantity: i64,
    category: String,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StockItemRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StockItemRow {
            name: row.try_get("name")?,
            quantity: row.try_get("quantity")?,
            category: row.try_get("category")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<StockItemRow> for StockItem {
    fn from(row: StockItemRow) -> Self {
        StockItem {
            name: row.name,
            quantity: row.quantity,
            category: row.category,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug)]
struct HistoryEntryRow {
    seq: i64,
    stock_name: String,
    quantity: i64,
    person: String,
    action: String,
    occurred_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for HistoryEntryRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(HistoryEntryRow {
            seq: row.try_get("seq")?,
            stock_name: row.try_get("stock_name")?,
            quantity: row.try_get("quantity")?,
            person: row.try_get("person")?,
            action: row.try_get("action")?,
            occurred_at: row.try_get("occurred_at")?,
        })
    }
}

impl TryFrom<HistoryEntryRow> for HistoryEntry {
    type Error = StoreError;

    fn try_from(row: HistoryEntryRow) -> Result<Self, StoreError> {
        let action: Action = row
            .action
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("bad action in history row {}: {e}", row.seq)))?;

        Ok(HistoryEntry {
            seq: row.seq as u64,
            stock_name: row.stock_name,
            quantity: row.quantity,
            person: row.person,
            action,
            occurred_at: row.occurred_at,
        })
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                // Unique violation: a concurrent insert raced on the name key.
                Some("23505") => StoreError::Conflict(msg),
                // Check constraint violation: the engine should have made this
                // impossible.
                Some("23514") => StoreError::Corrupt(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("decode failure in {operation}: {err}"))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}
