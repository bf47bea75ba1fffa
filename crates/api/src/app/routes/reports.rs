use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

/// Simple counts: distinct items, total quantity on hand, transactions.
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.summary().await {
        Ok(out) => (StatusCode::OK, Json(out)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// Replay the history against current stock and report any drift.
pub async fn audit(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.verify_audit().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
