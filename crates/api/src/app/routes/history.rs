use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

/// Full audit log, newest first.
pub async fn list_history(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.history().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
