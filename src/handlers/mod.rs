pub mod employees;
pub mod material_usage;
pub mod measurements;
pub mod orders;
pub mod purchase_orders;
pub mod suppliers;
pub mod tasks;
pub mod workload;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::workflow::WeightedScorer;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<crate::services::orders::OrderService>,
    pub order_workflow: Arc<crate::services::order_status::OrderWorkflowService>,
    pub tasks: Arc<crate::services::tasks::TaskService>,
    pub assignment: Arc<crate::services::assignment::AssignmentService>,
    pub workload: Arc<crate::services::workload::WorkloadService>,
    pub employees: Arc<crate::services::employees::EmployeeService>,
    pub suppliers: Arc<crate::services::suppliers::SupplierService>,
    pub purchase_orders: Arc<crate::services::purchase_orders::PurchaseOrderService>,
    pub material_usage: Arc<crate::services::material_usage::MaterialUsageService>,
    pub measurements: Arc<crate::services::measurements::MeasurementService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let default_capacity = config.default_employee_capacity;
        let scorer = Arc::new(WeightedScorer::default());

        Self {
            orders: Arc::new(crate::services::orders::OrderService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            order_workflow: Arc::new(crate::services::order_status::OrderWorkflowService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            tasks: Arc::new(crate::services::tasks::TaskService::new(
                db_pool.clone(),
                Some(event_sender.clone()),
            )),
            assignment: Arc::new(crate::services::assignment::AssignmentService::new(
                db_pool.clone(),
                scorer,
                default_capacity,
                Some(event_sender.clone()),
            )),
            workload: Arc::new(crate::services::workload::WorkloadService::new(
                db_pool.clone(),
                default_capacity,
            )),
            employees: Arc::new(crate::services::employees::EmployeeService::new(
                db_pool.clone(),
            )),
            suppliers: Arc::new(crate::services::suppliers::SupplierService::new(
                db_pool.clone(),
            )),
            purchase_orders: Arc::new(crate::services::purchase_orders::PurchaseOrderService::new(
                db_pool.clone(),
                Some(event_sender),
            )),
            material_usage: Arc::new(crate::services::material_usage::MaterialUsageService::new(
                db_pool.clone(),
            )),
            measurements: Arc::new(crate::services::measurements::MeasurementService::new(
                db_pool,
            )),
        }
    }
}
