//! Ledger storage boundary.
//!
//! This module defines an infrastructure-facing abstraction for persisting
//! stock levels and the append-only history without making any storage
//! assumptions. The engine talks to a [`LedgerStore`]; backends decide how the
//! two aggregates actually land on disk (or don't).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use r#trait::{LedgerStore, StoreError};
