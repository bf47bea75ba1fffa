//! The ledger engine: atomic operations over stock levels and history.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use stockroom_core::{
    Action, DomainError, HistoryEntry, HistoryRecord, ItemName, StockItem, SYSTEM_ACTOR,
};
use stockroom_infra::{LedgerStore, StoreError};

/// Ledger operation error.
///
/// The first three variants are business failures: local, synchronous, and
/// never retryable blindly. `Store` is an infrastructure failure that callers
/// may retry.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input. Caller bug; not retryable.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced stock item does not exist.
    #[error("item not found")]
    NotFound,

    /// A withdrawal asked for more than the current stock level.
    #[error("insufficient stock (available: {available})")]
    InsufficientStock { available: i64 },

    /// Storage failure. Safe to retry; no partial state was applied.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::NotFound => LedgerError::NotFound,
            DomainError::InsufficientStock { available } => {
                LedgerError::InsufficientStock { available }
            }
        }
    }
}

/// Outcome of a successful restock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restocked {
    pub name: String,
    pub new_quantity: i64,
    /// `Add` if the item was created, `Update` if it already existed.
    pub action: Action,
}

/// Outcome of a successful withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawn {
    pub name: String,
    pub remaining: i64,
}

/// Simple counts over the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub items: u64,
    pub total_quantity: i64,
    pub transactions: u64,
}

/// One item whose replayed history disagrees with its current quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditMismatch {
    pub name: String,
    /// Quantity the history replay arrives at.
    pub expected: i64,
    /// Quantity currently on the stock row (0 if the row is missing).
    pub actual: i64,
}

/// Result of replaying the full history against current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub consistent: bool,
    pub mismatches: Vec<AuditMismatch>,
}

/// The inventory ledger engine.
///
/// Owns a storage backend plus a write gate serializing all mutations. The
/// check and the mutation of `withdraw` (and the read-modify-write of
/// `restock`) both happen entirely inside the gate, and the state change plus
/// history append land through the store's single atomic commit — no caller
/// ever observes an interleaved state between the two.
///
/// Reads go straight to the store and may run concurrently with each other
/// and with a writer; the store's commit atomicity guarantees they see the
/// pre- or post-state of any mutation, never an intermediate.
pub struct Ledger<S: LedgerStore> {
    store: S,
    write_gate: Mutex<()>,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    /// Increase an item's quantity, creating the item on first restock.
    ///
    /// The history entry is attributed to the fixed system identity, never to
    /// a caller-supplied actor. A missing or blank category falls back to the
    /// default; restocking an existing item keeps its stored category.
    pub async fn restock(
        &self,
        name: &str,
        quantity: i64,
        category: Option<&str>,
    ) -> Result<Restocked, LedgerError> {
        let name = ItemName::parse(name)?;
        if quantity <= 0 {
            return Err(LedgerError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }

        let _gate = self.write_gate.lock().await;

        let now = Utc::now();
        let (item, action) = match self.store.fetch_item(name.as_str()).await? {
            Some(mut existing) => {
                existing.quantity = existing.quantity.checked_add(quantity).ok_or_else(|| {
                    LedgerError::Validation("quantity overflows the ledger".to_string())
                })?;
                existing.updated_at = now;
                (existing, Action::Update)
            }
            None => (StockItem::new(name, quantity, category, now), Action::Add),
        };

        let record = HistoryRecord {
            stock_name: item.name.clone(),
            quantity,
            person: SYSTEM_ACTOR.to_string(),
            action,
            occurred_at: now,
        };

        let new_quantity = item.quantity;
        let stock_name = item.name.clone();
        self.store.commit(item, record).await?;

        tracing::debug!(name = %stock_name, quantity, new_quantity, %action, "restocked");

        Ok(Restocked {
            name: stock_name,
            new_quantity,
            action,
        })
    }

    /// Decrease an item's quantity, attributed to a recipient.
    ///
    /// Fails without any state change if the item is unknown or the requested
    /// quantity exceeds current stock — there is no partial withdrawal.
    pub async fn withdraw(
        &self,
        name: &str,
        quantity: i64,
        person: &str,
    ) -> Result<Withdrawn, LedgerError> {
        let name = ItemName::parse(name)?;
        if quantity <= 0 {
            return Err(LedgerError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }
        let person = person.trim();
        if person.is_empty() {
            return Err(LedgerError::Validation("person cannot be empty".to_string()));
        }

        let _gate = self.write_gate.lock().await;

        let mut item = self
            .store
            .fetch_item(name.as_str())
            .await?
            .ok_or(LedgerError::NotFound)?;

        if quantity > item.quantity {
            return Err(LedgerError::InsufficientStock {
                available: item.quantity,
            });
        }

        let now = Utc::now();
        item.quantity -= quantity;
        item.updated_at = now;

        let record = HistoryRecord {
            stock_name: item.name.clone(),
            quantity,
            person: person.to_string(),
            action: Action::Remove,
            occurred_at: now,
        };

        let remaining = item.quantity;
        let stock_name = item.name.clone();
        self.store.commit(item, record).await?;

        tracing::debug!(name = %stock_name, quantity, remaining, person, "withdrawn");

        Ok(Withdrawn {
            name: stock_name,
            remaining,
        })
    }

    /// Full current snapshot, ordered by name. No side effects.
    pub async fn stock(&self) -> Result<Vec<StockItem>, LedgerError> {
        Ok(self.store.list_items().await?)
    }

    /// Full audit log, newest first. No side effects.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, LedgerError> {
        Ok(self.store.list_history().await?)
    }

    /// Distinct item count, total quantity on hand, and history length.
    ///
    /// Counts come from one store snapshot so a commit landing mid-read
    /// cannot skew them against each other.
    pub async fn summary(&self) -> Result<LedgerSummary, LedgerError> {
        let (items, history) = self.store.snapshot().await?;

        Ok(LedgerSummary {
            items: items.len() as u64,
            total_quantity: items.iter().map(|i| i.quantity).sum(),
            transactions: history.len() as u64,
        })
    }

    /// Replay consistency check: per item, summing ADD/UPDATE quantities minus
    /// REMOVE quantities across the whole history must reproduce the current
    /// quantity exactly.
    ///
    /// Both aggregates are read as one store snapshot; a concurrent commit is
    /// either fully in or fully out of the check, never half-visible, so a
    /// healthy ledger can never be reported inconsistent.
    pub async fn verify_audit(&self) -> Result<AuditReport, LedgerError> {
        let (items, history) = self.store.snapshot().await?;

        let mut replayed: BTreeMap<String, i64> = BTreeMap::new();
        for entry in &history {
            *replayed.entry(entry.stock_name.clone()).or_insert(0) += entry.delta();
        }

        let mut current: BTreeMap<String, i64> = BTreeMap::new();
        for item in &items {
            current.insert(item.name.clone(), item.quantity);
        }

        let mut mismatches = Vec::new();
        for (name, expected) in &replayed {
            let actual = current.remove(name).unwrap_or(0);
            if actual != *expected {
                mismatches.push(AuditMismatch {
                    name: name.clone(),
                    expected: *expected,
                    actual,
                });
            }
        }
        // Stock rows with no history at all cannot have been written by the
        // engine.
        for (name, actual) in current {
            mismatches.push(AuditMismatch {
                name,
                expected: 0,
                actual,
            });
        }

        Ok(AuditReport {
            consistent: mismatches.is_empty(),
            mismatches,
        })
    }
}
