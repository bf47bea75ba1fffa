use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_core::Action;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stocks).post(restock))
        .route("/remove", post(withdraw))
}

pub async fn list_stocks(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.stock().await {
        Ok(stocks) => (StatusCode::OK, Json(dto::StocksResponse { stocks })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn restock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    match services
        .restock(&body.name, body.quantity, body.category.as_deref())
        .await
    {
        Ok(out) => {
            // 201 when the item was created, 200 when an existing one grew.
            let status = match out.action {
                Action::Add => StatusCode::CREATED,
                _ => StatusCode::OK,
            };
            (status, Json(out)).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::WithdrawRequest>,
) -> axum::response::Response {
    match services
        .withdraw(&body.name, body.quantity, &body.person)
        .await
    {
        Ok(out) => (StatusCode::OK, Json(out)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
