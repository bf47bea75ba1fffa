use std::sync::Arc;

use thiserror::Error;

use stockroom_core::{HistoryEntry, HistoryRecord, StockItem};

/// Storage operation error.
///
/// These are **infrastructure errors** (backend unavailable, constraint races,
/// undecodable rows) as opposed to domain errors (validation, insufficient
/// stock). Callers may retry `Unavailable`; the others indicate a bug or a
/// race that the engine resolves by re-reading.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend or connection failure. Safe to retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A unique-constraint race surfaced by the backend.
    #[error("storage conflict: {0}")]
    Conflict(String),

    /// A row failed to decode, or in-process state is poisoned. Not retryable.
    #[error("storage corrupt: {0}")]
    Corrupt(String),
}

/// Persistence boundary for the ledger's two aggregates.
///
/// Stock rows are keyed by unique item name; history is append-only with
/// store-assigned, monotonically increasing sequence numbers. The one write
/// path, [`commit`](LedgerStore::commit), lands the stock upsert and the
/// history append **atomically** — either both are visible afterwards or
/// neither is. Readers never observe the gap between them.
///
/// Implementations must:
/// - enforce at most one stock row per distinct name
/// - assign history sequence numbers monotonically (no gaps, no duplicates)
/// - never modify or delete a history row once written
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    /// Look up one stock item by exact (case-sensitive) name.
    async fn fetch_item(&self, name: &str) -> Result<Option<StockItem>, StoreError>;

    /// Full stock snapshot, ascending by name.
    async fn list_items(&self) -> Result<Vec<StockItem>, StoreError>;

    /// Full audit log, newest first (descending timestamp, then descending
    /// sequence number within equal timestamps).
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Stock and history read as **one** consistent snapshot: no commit may
    /// land between the two halves. Orderings match [`list_items`] and
    /// [`list_history`].
    ///
    /// Composite reads that correlate the two aggregates (replay checks,
    /// summary counts) must use this instead of two separate calls.
    ///
    /// [`list_items`]: LedgerStore::list_items
    /// [`list_history`]: LedgerStore::list_history
    async fn snapshot(&self) -> Result<(Vec<StockItem>, Vec<HistoryEntry>), StoreError>;

    /// Atomically upsert the stock row **and** append the history record,
    /// assigning the next sequence number.
    async fn commit(
        &self,
        item: StockItem,
        record: HistoryRecord,
    ) -> Result<HistoryEntry, StoreError>;
}

#[async_trait::async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn fetch_item(&self, name: &str) -> Result<Option<StockItem>, StoreError> {
        (**self).fetch_item(name).await
    }

    async fn list_items(&self) -> Result<Vec<StockItem>, StoreError> {
        (**self).list_items().await
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        (**self).list_history().await
    }

    async fn snapshot(&self) -> Result<(Vec<StockItem>, Vec<HistoryEntry>), StoreError> {
        (**self).snapshot().await
    }

    async fn commit(
        &self,
        item: StockItem,
        record: HistoryRecord,
    ) -> Result<HistoryEntry, StoreError> {
        (**self).commit(item, record).await
    }
}
