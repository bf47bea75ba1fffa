//! Append-only transaction history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Kind of mutation a history entry records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// First restock of a name (the item was created).
    Add,
    /// Restock of an existing item.
    Update,
    /// Withdrawal to a recipient.
    Remove,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "ADD",
            Action::Update => "UPDATE",
            Action::Remove => "REMOVE",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Action {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" => Ok(Action::Add),
            "UPDATE" => Ok(Action::Update),
            "REMOVE" => Ok(Action::Remove),
            other => Err(DomainError::validation(format!("unknown action: {other}"))),
        }
    }
}

/// An audit fact prepared by the engine, not yet assigned a sequence number.
///
/// The storage backend assigns `seq` during commit, turning a record into a
/// [`HistoryEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub stock_name: String,
    /// Magnitude moved; always positive.
    pub quantity: i64,
    pub person: String,
    pub action: Action,
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,
}

impl HistoryRecord {
    /// Attach the store-assigned sequence number.
    pub fn into_entry(self, seq: u64) -> HistoryEntry {
        HistoryEntry {
            seq,
            stock_name: self.stock_name,
            quantity: self.quantity,
            person: self.person,
            action: self.action,
            occurred_at: self.occurred_at,
        }
    }
}

/// One committed, immutable audit record of a single mutating operation.
///
/// Entries are denormalized facts: `stock_name` is a historical copy and does
/// not follow later changes to the item. Entries are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Monotonically increasing position in the ledger's audit log.
    pub seq: u64,
    pub stock_name: String,
    pub quantity: i64,
    pub person: String,
    pub action: Action,
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Signed contribution of this entry to its item's stock level.
    ///
    /// Summing deltas per name across the whole log reproduces current
    /// quantities exactly (the replay consistency check).
    pub fn delta(&self) -> i64 {
        match self.action {
            Action::Add | Action::Update => self.quantity,
            Action::Remove => -self.quantity,
        }
    }
}
