use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use stockroom_ledger::LedgerError;

/// Map a ledger failure to its wire shape.
///
/// Business failures keep their own codes so the presentation layer can tell
/// the operator exactly what to fix; only `storage` is worth retrying.
pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Validation(detail) => json_error(StatusCode::BAD_REQUEST, "validation", detail),
        LedgerError::NotFound => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": "not_found" }))).into_response()
        }
        LedgerError::InsufficientStock { available } => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "insufficient_stock",
                "available": available,
            })),
        )
            .into_response(),
        LedgerError::Store(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    detail: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "error": code,
            "detail": detail.into(),
        })),
    )
        .into_response()
}
