//! Atelier API Library
//!
//! Backend for tailoring-business management: orders, workflow tasks,
//! employee assignment, workload reporting and procurement.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod services;
pub mod workflow;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit)
        };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// All v1 API routes.
pub fn api_v1_routes() -> Router<AppState> {
    let orders = Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders", post(handlers::orders::create_order))
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route("/orders/{id}", put(handlers::orders::update_order))
        .route(
            "/orders/by-number/{order_number}",
            get(handlers::orders::get_order_by_number),
        )
        .route(
            "/orders/{id}/status",
            put(handlers::orders::update_order_status),
        )
        .route("/orders/{id}/cancel", post(handlers::orders::cancel_order))
        .route(
            "/orders/{id}/history",
            get(handlers::orders::get_order_history),
        )
        .route(
            "/orders/{id}/measurements",
            get(handlers::measurements::measurements_for_order),
        )
        .route(
            "/orders/{id}/measurements",
            post(handlers::measurements::record_measurement),
        )
        .route(
            "/orders/{id}/materials",
            get(handlers::material_usage::usage_for_order),
        )
        .route(
            "/orders/{id}/materials",
            post(handlers::material_usage::record_usage),
        );

    let tasks = Router::new()
        .route("/tasks", get(handlers::tasks::list_tasks))
        .route("/tasks", post(handlers::tasks::create_task))
        .route("/tasks/{id}", get(handlers::tasks::get_task))
        .route("/tasks/{id}", delete(handlers::tasks::delete_task))
        .route(
            "/tasks/{id}/status",
            put(handlers::tasks::update_task_status),
        )
        .route("/tasks/{id}/assign", post(handlers::tasks::assign_task))
        .route(
            "/tasks/{id}/auto-assign",
            post(handlers::tasks::auto_assign_task),
        );

    let employees = Router::new()
        .route("/employees", get(handlers::employees::list_employees))
        .route("/employees", post(handlers::employees::create_employee))
        .route("/employees/{id}", get(handlers::employees::get_employee))
        .route("/employees/{id}", put(handlers::employees::update_employee))
        .route(
            "/employees/{id}",
            delete(handlers::employees::deactivate_employee),
        )
        .route(
            "/employees/{id}/skills",
            put(handlers::employees::replace_skills),
        )
        .route(
            "/employees/{id}/specializations",
            put(handlers::employees::replace_specializations),
        );

    let workload = Router::new()
        .route("/workload", get(handlers::workload::workload_report))
        .route(
            "/workload/employees",
            get(handlers::workload::employee_workloads),
        );

    let procurement = Router::new()
        .route("/suppliers", get(handlers::suppliers::list_suppliers))
        .route("/suppliers", post(handlers::suppliers::create_supplier))
        .route("/suppliers/{id}", get(handlers::suppliers::get_supplier))
        .route("/suppliers/{id}", put(handlers::suppliers::update_supplier))
        .route(
            "/suppliers/{id}",
            delete(handlers::suppliers::deactivate_supplier),
        )
        .route(
            "/purchase-orders",
            get(handlers::purchase_orders::list_purchase_orders),
        )
        .route(
            "/purchase-orders",
            post(handlers::purchase_orders::create_purchase_order),
        )
        .route(
            "/purchase-orders/{id}",
            get(handlers::purchase_orders::get_purchase_order),
        )
        .route(
            "/purchase-orders/{id}/status",
            put(handlers::purchase_orders::update_purchase_order_status),
        );

    let materials = Router::new().route(
        "/materials/{id}",
        delete(handlers::material_usage::delete_usage),
    );

    let measurements = Router::new().route(
        "/measurements/{id}",
        delete(handlers::measurements::delete_measurement),
    );

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(orders)
        .merge(tasks)
        .merge(employees)
        .merge(workload)
        .merge(procurement)
        .merge(materials)
        .merge(measurements)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "atelier-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(health_data)))
}

/// Request logging middleware: one line in, one line out with elapsed time.
pub async fn request_logging_middleware(
    request: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    tracing::info!(method = %method, uri = %uri, "incoming request");

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
