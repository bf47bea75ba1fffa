//! Request/response DTOs.
//!
//! Successful operation outcomes (`Restocked`, `Withdrawn`, `LedgerSummary`,
//! `AuditReport`) serialize straight from the ledger crate; only the request
//! bodies and the stock-list wrapper need shapes of their own.

use serde::{Deserialize, Serialize};

use stockroom_core::StockItem;

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub name: String,
    pub quantity: i64,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub name: String,
    pub quantity: i64,
    pub person: String,
}

/// Wire wrapper for the stock snapshot: `{"stocks": [...]}`.
#[derive(Debug, Serialize)]
pub struct StocksResponse {
    pub stocks: Vec<StockItem>,
}
