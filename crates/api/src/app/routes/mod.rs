use axum::{routing::get, Router};

pub mod history;
pub mod reports;
pub mod stocks;
pub mod system;

/// Router for all ledger endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/api/stocks", stocks::router())
        .route("/api/history", get(history::list_history))
        .route("/api/summary", get(reports::summary))
        .route("/api/audit", get(reports::audit))
}
