use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::employee::{self, Entity as EmployeeEntity},
    entities::task::{self, Entity as TaskEntity},
    errors::ServiceError,
    workflow::TaskStatus,
};

/// Per-employee workload summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeWorkload {
    pub employee_id: Uuid,
    pub employee_number: String,
    pub name: String,
    pub active_tasks: u64,
    pub total_estimated_hours: Decimal,
    pub overdue_tasks: u64,
    pub capacity: i64,
    /// active_tasks / capacity * 100, unclamped; values above 100 signal
    /// over-capacity.
    pub utilization_pct: f64,
}

/// Full workload report for the dashboard view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkloadReport {
    pub employees: Vec<EmployeeWorkload>,
    pub tasks_by_stage: BTreeMap<String, u64>,
    pub tasks_by_priority: BTreeMap<String, u64>,
    pub total_employees: u64,
    pub total_active_tasks: u64,
    pub total_overdue_tasks: u64,
    pub average_utilization: f64,
}

/// Read-side aggregation over current task/employee state. Mutates nothing.
#[derive(Clone)]
pub struct WorkloadService {
    db_pool: Arc<DbPool>,
    default_capacity: i64,
}

impl WorkloadService {
    pub fn new(db_pool: Arc<DbPool>, default_capacity: i64) -> Self {
        Self {
            db_pool,
            default_capacity,
        }
    }

    /// Summarizes workload for every active employee.
    #[instrument(skip(self))]
    pub async fn employee_workloads(&self) -> Result<Vec<EmployeeWorkload>, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let employees = EmployeeEntity::find()
            .filter(employee::Column::IsActive.eq(true))
            .all(db)
            .await?;

        let mut workloads = Vec::with_capacity(employees.len());
        for emp in employees {
            let tasks = TaskEntity::find()
                .filter(task::Column::AssignedEmployeeId.eq(emp.id))
                .all(db)
                .await?;

            let mut active_tasks = 0u64;
            let mut total_estimated_hours = Decimal::ZERO;
            let mut overdue_tasks = 0u64;

            for t in &tasks {
                let status = TaskStatus::from_str(&t.status).ok();
                let active = status.map(TaskStatus::is_active).unwrap_or(false);
                if active {
                    active_tasks += 1;
                    if let Some(hours) = t.estimated_hours {
                        total_estimated_hours += hours;
                    }
                }
                let completed = status == Some(TaskStatus::Completed);
                if matches!(t.deadline, Some(deadline) if deadline < now) && !completed {
                    overdue_tasks += 1;
                }
            }

            let capacity = emp.capacity.map(i64::from).unwrap_or(self.default_capacity);
            let utilization_pct = if capacity > 0 {
                active_tasks as f64 / capacity as f64 * 100.0
            } else {
                0.0
            };

            workloads.push(EmployeeWorkload {
                employee_id: emp.id,
                employee_number: emp.employee_number,
                name: emp.name,
                active_tasks,
                total_estimated_hours,
                overdue_tasks,
                capacity,
                utilization_pct,
            });
        }

        Ok(workloads)
    }

    /// Builds the full workload report: per-employee summaries plus task
    /// distribution by stage and priority and headline totals.
    #[instrument(skip(self))]
    pub async fn workload_report(&self) -> Result<WorkloadReport, ServiceError> {
        let db = &*self.db_pool;
        let employees = self.employee_workloads().await?;

        let all_tasks = TaskEntity::find().all(db).await?;
        let mut tasks_by_stage: BTreeMap<String, u64> = BTreeMap::new();
        let mut tasks_by_priority: BTreeMap<String, u64> = BTreeMap::new();
        for t in &all_tasks {
            let active = TaskStatus::from_str(&t.status)
                .map(TaskStatus::is_active)
                .unwrap_or(false);
            if active {
                *tasks_by_stage.entry(t.stage.clone()).or_default() += 1;
                *tasks_by_priority.entry(t.priority.clone()).or_default() += 1;
            }
        }

        let total_employees = employees.len() as u64;
        let total_active_tasks = employees.iter().map(|w| w.active_tasks).sum();
        let total_overdue_tasks = employees.iter().map(|w| w.overdue_tasks).sum();
        let average_utilization = if employees.is_empty() {
            0.0
        } else {
            employees.iter().map(|w| w.utilization_pct).sum::<f64>() / employees.len() as f64
        };

        Ok(WorkloadReport {
            employees,
            tasks_by_stage,
            tasks_by_priority,
            total_employees,
            total_active_tasks,
            total_overdue_tasks,
            average_utilization,
        })
    }
}
