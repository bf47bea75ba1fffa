//! `stockroom-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod history;
pub mod item;

pub use error::{DomainError, DomainResult};
pub use history::{Action, HistoryEntry, HistoryRecord};
pub use item::{DEFAULT_CATEGORY, ItemName, StockItem, SYSTEM_ACTOR};
