use axum::{response::Json, routing::get, Router};
use utoipa::OpenApi;

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        description = r#"
Backend API for tailoring-business management.

- **Orders**: customer orders with a fixed status workflow and append-only history
- **Tasks**: per-stage work items that drive the order status
- **Assignment**: skill-and-workload based routing of tasks to employees
- **Workload**: per-employee utilization and task distribution reporting
- **Procurement**: suppliers and purchase orders
- **Measurements & Materials**: customer measurements and material usage per order

List endpoints accept `page` and `limit` query parameters.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    tags(
        (name = "Orders", description = "Order management and status workflow"),
        (name = "Tasks", description = "Workflow tasks and assignment"),
        (name = "Employees", description = "Employee, skill and specialization management"),
        (name = "Workload", description = "Workload reporting"),
        (name = "Procurement", description = "Suppliers and purchase orders"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_by_number,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::cancel_order,
        crate::handlers::orders::get_order_history,
        crate::handlers::tasks::list_tasks,
        crate::handlers::tasks::get_task,
        crate::handlers::tasks::create_task,
        crate::handlers::tasks::update_task_status,
        crate::handlers::tasks::assign_task,
        crate::handlers::tasks::auto_assign_task,
        crate::handlers::tasks::delete_task,
        crate::handlers::employees::list_employees,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::update_employee,
        crate::handlers::employees::deactivate_employee,
        crate::handlers::employees::replace_skills,
        crate::handlers::employees::replace_specializations,
        crate::handlers::workload::workload_report,
        crate::handlers::workload::employee_workloads,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::deactivate_supplier,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order_status,
        crate::handlers::material_usage::record_usage,
        crate::handlers::material_usage::usage_for_order,
        crate::handlers::material_usage::delete_usage,
        crate::handlers::measurements::record_measurement,
        crate::handlers::measurements::measurements_for_order,
        crate::handlers::measurements::delete_measurement,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::services::assignment::AssignmentOutcome,
        crate::services::workload::EmployeeWorkload,
        crate::services::workload::WorkloadReport,
    ))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document as JSON.
pub fn docs_routes() -> Router<AppState> {
    Router::new().route(
        "/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_serializes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("Atelier API"));
        assert!(json.contains("ErrorResponse"));
        assert!(json.contains("/api/v1/orders/{id}/status"));
        assert!(json.contains("/api/v1/tasks/{id}/auto-assign"));
    }
}
