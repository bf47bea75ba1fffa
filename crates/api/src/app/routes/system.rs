use axum::http::StatusCode;

/// Liveness probe polled by dashboard clients.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
