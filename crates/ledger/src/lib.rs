//! `stockroom-ledger` — the inventory ledger engine.
//!
//! Single authoritative owner of stock state and history. All
//! balance-affecting operations pass through [`Ledger`]; clients never mutate
//! state directly.

pub mod engine;

pub use engine::{
    AuditMismatch, AuditReport, Ledger, LedgerError, LedgerSummary, Restocked, Withdrawn,
};
