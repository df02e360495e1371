mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

fn as_number(value: &serde_json::Value) -> f64 {
    value
        .as_str()
        .map(|s| s.parse().expect("non-numeric string"))
        .or_else(|| value.as_f64())
        .expect("expected a number")
}

async fn seed_supplier(app: &TestApp) -> String {
    let (status, body) = app
        .post(
            "/api/v1/suppliers",
            json!({
                "name": "Mehta Fabrics",
                "contact_person": "D. Mehta",
                "email": "orders@mehtafabrics.example"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_str().expect("supplier id").to_string()
}

async fn seed_purchase_order(app: &TestApp, supplier_id: &str) -> String {
    let (status, body) = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "supplier_id": supplier_id,
                "total_amount": "1200.00",
                "notes": "silk for the wedding season"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "draft");
    assert!(body["data"]["po_number"].as_str().unwrap().starts_with("PO-"));
    body["data"]["id"].as_str().expect("po id").to_string()
}

#[tokio::test]
async fn purchase_orders_walk_their_status_chain() {
    let app = TestApp::new().await;
    let supplier_id = seed_supplier(&app).await;
    let po_id = seed_purchase_order(&app, &supplier_id).await;

    // draft -> received skips a step.
    let (status, _) = app
        .put(
            &format!("/api/v1/purchase-orders/{po_id}/status"),
            json!({ "status": "received" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for next in ["ordered", "received"] {
        let (status, body) = app
            .put(
                &format!("/api/v1/purchase-orders/{po_id}/status"),
                json!({ "status": next }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], *next);
    }

    // Received is terminal.
    let (status, _) = app
        .put(
            &format!("/api/v1/purchase-orders/{po_id}/status"),
            json!({ "status": "cancelled" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn purchase_orders_require_an_existing_supplier() {
    let app = TestApp::new().await;
    let (status, _) = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "supplier_id": "00000000-0000-0000-0000-000000000000",
                "total_amount": "10.00"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn purchase_order_list_filters_by_supplier_and_status() {
    let app = TestApp::new().await;
    let supplier_a = seed_supplier(&app).await;
    let po = seed_purchase_order(&app, &supplier_a).await;
    seed_purchase_order(&app, &supplier_a).await;

    app.put(
        &format!("/api/v1/purchase-orders/{po}/status"),
        json!({ "status": "ordered" }),
    )
    .await;

    let (status, body) = app
        .get(&format!(
            "/api/v1/purchase-orders?supplier_id={supplier_a}&status=ordered"
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_str().unwrap(), po);
}

#[tokio::test]
async fn duplicate_supplier_names_are_allowed_but_deactivation_hides_them() {
    let app = TestApp::new().await;
    let supplier_id = seed_supplier(&app).await;

    let (status, _) = app
        .request(
            axum::http::Method::DELETE,
            &format!("/api/v1/suppliers/{supplier_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, visible) = app.get("/api/v1/suppliers").await;
    assert_eq!(visible["data"]["items"].as_array().unwrap().len(), 0);

    let (_, all) = app.get("/api/v1/suppliers?include_inactive=true").await;
    assert_eq!(all["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn material_usage_accumulates_order_cost() {
    let app = TestApp::new().await;
    let (_, order) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_name": "Leela Rao",
                "priority": "normal",
                "garment_type": "saree blouse",
                "total_amount": "80.00",
                "deposit_amount": "0.00"
            }),
        )
        .await;
    let order_id = order["data"]["id"].as_str().unwrap().to_string();

    for (name, qty, unit_cost) in [("silk", "3.5", "12.00"), ("lining", "2", "4.50")] {
        let (status, body) = app
            .post(
                &format!("/api/v1/orders/{order_id}/materials"),
                json!({
                    "material_name": name,
                    "quantity": qty,
                    "unit": "m",
                    "unit_cost": unit_cost
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (status, body) = app
        .get(&format!("/api/v1/orders/{order_id}/materials"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 2);
    // 3.5 * 12.00 + 2 * 4.50 = 51.0
    assert_eq!(as_number(&body["data"]["total_cost"]), 51.0);

    // Zero quantity is rejected.
    let (status, _) = app
        .post(
            &format!("/api/v1/orders/{order_id}/materials"),
            json!({
                "material_name": "thread",
                "quantity": "0",
                "unit": "spool",
                "unit_cost": "1.00"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn re_recording_a_measurement_updates_instead_of_duplicating() {
    let app = TestApp::new().await;
    let (_, order) = app
        .post(
            "/api/v1/orders",
            json!({
                "customer_name": "Leela Rao",
                "priority": "normal",
                "garment_type": "saree blouse",
                "total_amount": "80.00",
                "deposit_amount": "0.00"
            }),
        )
        .await;
    let order_id = order["data"]["id"].as_str().unwrap().to_string();

    app.post(
        &format!("/api/v1/orders/{order_id}/measurements"),
        json!({ "name": "chest", "value_cm": "92" }),
    )
    .await;
    app.post(
        &format!("/api/v1/orders/{order_id}/measurements"),
        json!({ "name": "waist", "value_cm": "78" }),
    )
    .await;
    // Corrected fitting.
    let (status, updated) = app
        .post(
            &format!("/api/v1/orders/{order_id}/measurements"),
            json!({ "name": "chest", "value_cm": "94", "notes": "second fitting" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");

    let (_, body) = app
        .get(&format!("/api/v1/orders/{order_id}/measurements"))
        .await;
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    let chest = entries.iter().find(|m| m["name"] == "chest").unwrap();
    assert_eq!(as_number(&chest["value_cm"]), 94.0);
    assert_eq!(chest["notes"], "second fitting");
}
