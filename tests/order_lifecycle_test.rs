mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

/// Decimal fields serialize as strings; compare numerically to stay
/// independent of trailing-zero scale.
fn as_number(value: &serde_json::Value) -> f64 {
    value
        .as_str()
        .map(|s| s.parse().expect("non-numeric string"))
        .or_else(|| value.as_f64())
        .expect("expected a number")
}

fn order_body() -> serde_json::Value {
    json!({
        "customer_name": "Asha Verma",
        "customer_phone": "+91-98-5550-1234",
        "priority": "normal",
        "garment_type": "sherwani",
        "service_description": "Wedding sherwani, full custom",
        "total_amount": "450.00",
        "deposit_amount": "150.00"
    })
}

async fn create_order(app: &TestApp) -> String {
    let (status, body) = app.post("/api/v1/orders", order_body()).await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    assert_eq!(body["data"]["status"], "received");
    body["data"]["id"].as_str().expect("order id").to_string()
}

#[tokio::test]
async fn new_orders_start_received_with_computed_balance() {
    let app = TestApp::new().await;
    let (status, body) = app.post("/api/v1/orders", order_body()).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["status"], "received");
    assert_eq!(as_number(&data["balance_amount"]), 300.0);
    assert_eq!(data["version"], 1);
    assert!(data["order_number"]
        .as_str()
        .unwrap()
        .starts_with("ORD-"));
}

#[tokio::test]
async fn deposit_exceeding_total_is_rejected() {
    let app = TestApp::new().await;
    let mut body = order_body();
    body["deposit_amount"] = json!("500.00");

    let (status, response) = app.post("/api/v1/orders", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Bad Request");
}

#[tokio::test]
async fn skipping_a_stage_is_rejected_and_leaves_no_history() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    let (status, body) = app
        .put(
            &format!("/api/v1/orders/{id}/status"),
            json!({ "status": "stitching" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Cannot transition"));

    // A rejected transition must not write history.
    let (status, history) = app.get(&format!("/api/v1/orders/{id}/history")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn full_workflow_appends_one_history_row_per_transition() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    let chain = [
        "cutting",
        "stitching",
        "quality_check",
        "pressing",
        "ready",
        "delivered",
    ];
    for (i, next) in chain.iter().enumerate() {
        let (status, body) = app
            .put(
                &format!("/api/v1/orders/{id}/status"),
                json!({ "status": next, "acting_user": "master.tailor" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "transition to {next} failed: {body}");
        assert_eq!(body["data"]["status"], *next);

        let (_, history) = app.get(&format!("/api/v1/orders/{id}/history")).await;
        let entries = history["data"].as_array().unwrap();
        assert_eq!(entries.len(), i + 1);
        assert_eq!(entries[i]["status"], *next);
        assert_eq!(entries[i]["created_by"], "master.tailor");
    }

    // Delivered is terminal.
    let (status, _) = app
        .put(
            &format!("/api/v1/orders/{id}/status"),
            json!({ "status": "received" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancellation_is_reachable_from_any_open_status_but_terminal() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    app.put(
        &format!("/api/v1/orders/{id}/status"),
        json!({ "status": "cutting" }),
    )
    .await;

    let (status, body) = app
        .post(
            &format!("/api/v1/orders/{id}/cancel"),
            json!({ "reason": "customer withdrew" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    // Cancelled is terminal: no further transitions.
    let (status, _) = app
        .put(
            &format!("/api/v1/orders/{id}/status"),
            json!({ "status": "cutting" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, history) = app.get(&format!("/api/v1/orders/{id}/history")).await;
    let entries = history["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["status"], "cancelled");
    assert_eq!(entries[1]["notes"], "customer withdrew");
}

#[tokio::test]
async fn detail_updates_never_touch_status_and_bump_version() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    let (status, body) = app
        .put(
            &format!("/api/v1/orders/{id}"),
            json!({ "total_amount": "500.00", "notes": "extra embroidery" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "received");
    assert_eq!(as_number(&body["data"]["balance_amount"]), 350.0);
    assert_eq!(body["data"]["version"], 2);
}

#[tokio::test]
async fn lookup_by_order_number_and_unknown_ids() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    let (_, body) = app.get(&format!("/api/v1/orders/{id}")).await;
    let number = body["data"]["order_number"].as_str().unwrap().to_string();

    let (status, by_number) = app
        .get(&format!("/api/v1/orders/by-number/{number}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_number["data"]["id"].as_str().unwrap(), id);

    let (status, _) = app
        .get("/api/v1/orders/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::GET,
            "/api/v1/orders/00000000-0000-0000-0000-000000000000/history",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
