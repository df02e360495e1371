mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use atelier_api::errors::ServiceError;
use atelier_api::services::orders::CreateOrderRequest;
use atelier_api::services::tasks::{CreateTaskRequest, UpdateTaskStatusRequest};
use atelier_api::workflow::{OrderStatus, Priority, TaskStage, TaskStatus};
use common::TestApp;
use rust_decimal_macros::dec;

async fn seed_order(app: &TestApp) -> Uuid {
    app.state
        .services
        .orders
        .create_order(CreateOrderRequest {
            customer_name: "Ravi Nair".to_string(),
            customer_phone: None,
            priority: Priority::Normal,
            garment_type: "suit".to_string(),
            service_description: None,
            delivery_date: None,
            total_amount: dec!(200),
            deposit_amount: dec!(50),
            is_urgent: false,
            notes: None,
        })
        .await
        .expect("order")
        .id
}

async fn seed_task(app: &TestApp, order_id: Uuid, stage: TaskStage) -> Uuid {
    app.state
        .services
        .tasks
        .create_task(CreateTaskRequest {
            order_id,
            stage,
            priority: Priority::Normal,
            required_skills: vec![],
            deadline: None,
            estimated_hours: None,
            notes: None,
        })
        .await
        .expect("task")
        .id
}

async fn set_task_status(app: &TestApp, task_id: Uuid, status: TaskStatus) {
    app.state
        .services
        .tasks
        .update_task_status(
            task_id,
            UpdateTaskStatusRequest {
                status,
                actual_hours: None,
                notes: None,
            },
        )
        .await
        .expect("task status");
}

#[tokio::test]
async fn in_progress_task_pulls_order_to_its_stage() {
    let app = TestApp::new().await;
    let order_id = seed_order(&app).await;
    let task_id = seed_task(&app, order_id, TaskStage::Cutting).await;
    set_task_status(&app, task_id, TaskStatus::InProgress).await;

    let outcome = app
        .state
        .services
        .order_workflow
        .sync_from_tasks(order_id)
        .await
        .expect("sync");

    assert!(outcome.applied);
    assert_eq!(outcome.derived_status, OrderStatus::Cutting);

    // The applied derivation shows up in history like any transition.
    let history = app
        .state
        .services
        .orders
        .get_order_history(order_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, "cutting");
    assert_eq!(history[0].notes.as_deref(), Some("Derived from task states"));
}

#[tokio::test]
async fn matching_derived_status_is_a_no_op() {
    let app = TestApp::new().await;
    let order_id = seed_order(&app).await;
    seed_task(&app, order_id, TaskStage::Cutting).await;

    // Pending cutting task derives "received"? No: lowest pending stage is
    // cutting, so the derived status is cutting; apply it first.
    app.state
        .services
        .order_workflow
        .sync_from_tasks(order_id)
        .await
        .expect("first sync");

    let outcome = app
        .state
        .services
        .order_workflow
        .sync_from_tasks(order_id)
        .await
        .expect("second sync");
    assert!(!outcome.applied);
    assert_eq!(outcome.derived_status, OrderStatus::Cutting);

    let history = app
        .state
        .services
        .orders
        .get_order_history(order_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1, "no-op sync must not append history");
}

#[tokio::test]
async fn orders_with_no_tasks_derive_received() {
    let app = TestApp::new().await;
    let order_id = seed_order(&app).await;

    let outcome = app
        .state
        .services
        .order_workflow
        .sync_from_tasks(order_id)
        .await
        .expect("sync");
    assert_eq!(outcome.derived_status, OrderStatus::Received);
    assert!(!outcome.applied);
}

#[tokio::test]
async fn illegal_derived_status_is_a_conflict_and_leaves_order_untouched() {
    let app = TestApp::new().await;
    let order_id = seed_order(&app).await;

    // Order is still "received" but its only task is already completed,
    // deriving "ready" which received cannot jump to.
    let task_id = seed_task(&app, order_id, TaskStage::Cutting).await;
    set_task_status(&app, task_id, TaskStatus::Completed).await;

    let err = app
        .state
        .services
        .order_workflow
        .sync_from_tasks(order_id)
        .await
        .expect_err("conflict expected");
    assert_matches!(
        err,
        ServiceError::InconsistentDerivedStatus {
            current: OrderStatus::Received,
            derived: OrderStatus::Ready,
        }
    );

    let status = app
        .state
        .services
        .order_workflow
        .get_status(order_id)
        .await
        .expect("status");
    assert_eq!(status, OrderStatus::Received);
}

#[tokio::test]
async fn all_tasks_completed_derive_ready_when_reachable() {
    let app = TestApp::new().await;
    let order_id = seed_order(&app).await;
    let cutting = seed_task(&app, order_id, TaskStage::Cutting).await;
    let pressing = seed_task(&app, order_id, TaskStage::Pressing).await;

    // Walk the order to pressing through the engine first.
    for status in [
        OrderStatus::Cutting,
        OrderStatus::Stitching,
        OrderStatus::QualityCheck,
        OrderStatus::Pressing,
    ] {
        app.state
            .services
            .order_workflow
            .update_status(order_id, status, None, None)
            .await
            .expect("walk");
    }

    set_task_status(&app, cutting, TaskStatus::Completed).await;
    set_task_status(&app, pressing, TaskStatus::Completed).await;

    let outcome = app
        .state
        .services
        .order_workflow
        .sync_from_tasks(order_id)
        .await
        .expect("sync");
    assert!(outcome.applied);
    assert_eq!(outcome.derived_status, OrderStatus::Ready);
}

#[tokio::test]
async fn cancelled_stage_tasks_are_ignored_by_derivation() {
    let app = TestApp::new().await;
    let order_id = seed_order(&app).await;
    let cancelled_task = seed_task(&app, order_id, TaskStage::Cancelled).await;
    set_task_status(&app, cancelled_task, TaskStatus::InProgress).await;
    seed_task(&app, order_id, TaskStage::Cutting).await;

    let outcome = app
        .state
        .services
        .order_workflow
        .sync_from_tasks(order_id)
        .await
        .expect("sync");
    // Pending cutting task decides; the cancelled-stage task never wins.
    assert_eq!(outcome.derived_status, OrderStatus::Cutting);
}

#[tokio::test]
async fn task_status_update_over_http_reports_sync_outcome() {
    let app = TestApp::new().await;
    let order_id = seed_order(&app).await;
    let task_id = seed_task(&app, order_id, TaskStage::Cutting).await;

    let (status, body) = app
        .put(
            &format!("/api/v1/tasks/{task_id}/status"),
            json!({ "status": "in_progress" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["order_status_updated"], true);
    assert_eq!(body["data"]["derived_order_status"], "cutting");
    assert!(body["data"]["sync_conflict"].is_null());
}

#[tokio::test]
async fn task_status_update_over_http_surfaces_sync_conflict() {
    let app = TestApp::new().await;
    let order_id = seed_order(&app).await;
    let task_id = seed_task(&app, order_id, TaskStage::Stitching).await;

    // Completing the only task derives "ready", unreachable from
    // "received". The task update itself must still succeed.
    let (status, body) = app
        .put(
            &format!("/api/v1/tasks/{task_id}/status"),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["task"]["status"], "completed");
    assert_eq!(body["data"]["order_status_updated"], false);
    assert!(body["data"]["sync_conflict"]
        .as_str()
        .unwrap()
        .contains("not a legal transition"));
}
