use std::collections::BTreeMap;
use std::sync::RwLock;

use stockroom_core::{HistoryEntry, HistoryRecord, StockItem};

use super::r#trait::{LedgerStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    /// Stock rows keyed by name; the `BTreeMap` gives by-name order for free.
    items: BTreeMap<String, StockItem>,
    /// Append-only audit log in insertion order.
    history: Vec<HistoryEntry>,
    next_seq: u64,
}

/// In-memory ledger store.
///
/// Intended for tests/dev. One write guard per commit makes the stock upsert
/// and history append atomic with respect to all readers.
#[derive(Debug)]
pub struct InMemoryLedgerStore {
    inner: RwLock<Inner>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: BTreeMap::new(),
                history: Vec::new(),
                next_seq: 1,
            }),
        }
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Corrupt("lock poisoned".to_string())
}

fn newest_first(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(b.seq.cmp(&a.seq)));
    entries
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn fetch_item(&self, name: &str) -> Result<Option<StockItem>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.items.get(name).cloned())
    }

    async fn list_items(&self) -> Result<Vec<StockItem>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.items.values().cloned().collect())
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(newest_first(inner.history.clone()))
    }

    async fn snapshot(&self) -> Result<(Vec<StockItem>, Vec<HistoryEntry>), StoreError> {
        // One read guard covers both aggregates, so no commit can land
        // between them.
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let items = inner.items.values().cloned().collect();
        let history = newest_first(inner.history.clone());
        Ok((items, history))
    }

    async fn commit(
        &self,
        item: StockItem,
        record: HistoryRecord,
    ) -> Result<HistoryEntry, StoreError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let entry = record.into_entry(seq);
        inner.items.insert(item.name.clone(), item);
        inner.history.push(entry.clone());

        Ok(entry)
    }
}
