use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use stockroom_api::app;
use stockroom_api::app::services::AppServices;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, pinned to the in-memory store, bound to an
        // ephemeral port.
        let app = app::build_app_with(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn restock(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    quantity: i64,
    category: &str,
) -> reqwest::Response {
    client
        .post(format!("{}/api/stocks", base_url))
        .json(&json!({ "name": name, "quantity": quantity, "category": category }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_is_alive() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn restock_then_withdraw_lifecycle() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // First restock creates the item.
    let res = restock(&client, &srv.base_url, "Pens", 10, "Stationery").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Pens");
    assert_eq!(body["newQuantity"], 10);
    assert_eq!(body["action"], "ADD");

    // Second restock updates it.
    let res = restock(&client, &srv.base_url, "Pens", 5, "Stationery").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["newQuantity"], 15);
    assert_eq!(body["action"], "UPDATE");

    // Withdraw part of it.
    let res = client
        .post(format!("{}/api/stocks/remove", srv.base_url))
        .json(&json!({ "name": "Pens", "quantity": 4, "person": "Alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Pens");
    assert_eq!(body["remaining"], 11);

    // Snapshot reflects the final quantity.
    let res = client
        .get(format!("{}/api/stocks", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let stocks = body["stocks"].as_array().unwrap();
    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0]["name"], "Pens");
    assert_eq!(stocks[0]["quantity"], 11);
    assert_eq!(stocks[0]["category"], "Stationery");
    assert!(stocks[0].get("updatedAt").is_some());
}

#[tokio::test]
async fn history_is_newest_first_and_complete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    restock(&client, &srv.base_url, "Pens", 10, "Stationery").await;
    restock(&client, &srv.base_url, "Pens", 5, "Stationery").await;
    client
        .post(format!("{}/api/stocks/remove", srv.base_url))
        .json(&json!({ "name": "Pens", "quantity": 4, "person": "Alice" }))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/api/history", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let entries: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["action"], "REMOVE");
    assert_eq!(entries[0]["person"], "Alice");
    assert_eq!(entries[1]["action"], "UPDATE");
    assert_eq!(entries[2]["action"], "ADD");
    assert_eq!(entries[2]["person"], "SYSTEM");
    assert_eq!(entries[2]["stockName"], "Pens");
}

#[tokio::test]
async fn validation_failures_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = restock(&client, &srv.base_url, "Pens", 0, "Stationery").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation");
    assert!(body["detail"].as_str().is_some());

    let res = restock(&client, &srv.base_url, "   ", 5, "Stationery").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn withdraw_failures_carry_their_reason() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Unknown item.
    let res = client
        .post(format!("{}/api/stocks/remove", srv.base_url))
        .json(&json!({ "name": "Stapler", "quantity": 1, "person": "Bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    // Over-limit withdrawal reports what's available and changes nothing.
    restock(&client, &srv.base_url, "Pens", 11, "Stationery").await;
    let res = client
        .post(format!("{}/api/stocks/remove", srv.base_url))
        .json(&json!({ "name": "Pens", "quantity": 50, "person": "Alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(body["available"], 11);

    let res = client
        .get(format!("{}/api/stocks", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["stocks"][0]["quantity"], 11);
}

#[tokio::test]
async fn summary_and_audit_report_simple_counts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    restock(&client, &srv.base_url, "Pens", 10, "Stationery").await;
    restock(&client, &srv.base_url, "Clips", 20, "Stationery").await;
    client
        .post(format!("{}/api/stocks/remove", srv.base_url))
        .json(&json!({ "name": "Pens", "quantity": 3, "person": "Alice" }))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/api/summary", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"], 2);
    assert_eq!(body["totalQuantity"], 27);
    assert_eq!(body["transactions"], 3);

    let res = client
        .get(format!("{}/api/audit", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["consistent"], true);
    assert_eq!(body["mismatches"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn stocks_are_listed_in_name_order() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    restock(&client, &srv.base_url, "Staplers", 1, "Office").await;
    restock(&client, &srv.base_url, "Clips", 1, "Office").await;
    restock(&client, &srv.base_url, "Pens", 1, "Office").await;

    let res = client
        .get(format!("{}/api/stocks", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let names: Vec<&str> = body["stocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Clips", "Pens", "Staplers"]);
}
