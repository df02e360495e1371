use crate::{
    db::DbPool,
    entities::employee::Entity as EmployeeEntity,
    entities::order::Entity as OrderEntity,
    entities::task::{
        self, ActiveModel as TaskActiveModel, Entity as TaskEntity, Model as TaskModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    workflow::{Priority, TaskStage, TaskStatus},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateTaskRequest {
    pub order_id: Uuid,
    pub stage: TaskStage,
    pub priority: Priority,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub estimated_hours: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
    pub actual_hours: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub stage: String,
    pub status: String,
    pub priority: String,
    pub assigned_employee_id: Option<Uuid>,
    pub required_skills: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub estimated_hours: Option<Decimal>,
    pub actual_hours: Option<Decimal>,
    /// Computed from (deadline, status, now); not a stored column.
    pub is_overdue: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default, Clone)]
pub struct TaskFilters {
    pub order_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub stage: Option<TaskStage>,
}

/// Tasks persist their required skills as a comma-separated list.
pub(crate) fn join_skills(skills: &[String]) -> Option<String> {
    if skills.is_empty() {
        None
    } else {
        Some(skills.join(","))
    }
}

pub(crate) fn split_skills(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// True when the task has blown its deadline and is not completed.
pub(crate) fn is_task_overdue(model: &TaskModel, now: DateTime<Utc>) -> bool {
    let not_completed = TaskStatus::from_str(&model.status)
        .map(|s| s != TaskStatus::Completed)
        .unwrap_or(true);
    matches!(model.deadline, Some(deadline) if deadline < now) && not_completed
}

/// Service for managing workflow tasks.
#[derive(Clone)]
pub struct TaskService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl TaskService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a task under an order. Tasks start PENDING and unassigned.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, stage = %request.stage))]
    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
    ) -> Result<TaskResponse, ServiceError> {
        let db = &*self.db_pool;

        OrderEntity::find_by_id(request.order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order {} not found", request.order_id))
            })?;

        let now = Utc::now();
        let task_id = Uuid::new_v4();
        let active = TaskActiveModel {
            id: Set(task_id),
            order_id: Set(request.order_id),
            stage: Set(request.stage.to_string()),
            status: Set(TaskStatus::Pending.to_string()),
            priority: Set(request.priority.to_string()),
            assigned_employee_id: Set(None),
            required_skills: Set(join_skills(&request.required_skills)),
            deadline: Set(request.deadline),
            estimated_hours: Set(request.estimated_hours),
            actual_hours: Set(None),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = active.insert(db).await?;
        info!(task_id = %task_id, order_id = %request.order_id, "task created");

        if let Some(sender) = &self.event_sender {
            let event = Event::TaskCreated {
                task_id,
                order_id: request.order_id,
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, task_id = %task_id, "failed to send task created event");
            }
        }

        Ok(model_to_response(model))
    }

    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn get_task(&self, task_id: Uuid) -> Result<Option<TaskResponse>, ServiceError> {
        let db = &*self.db_pool;
        let model = TaskEntity::find_by_id(task_id).one(db).await?;
        Ok(model.map(model_to_response))
    }

    #[instrument(skip(self))]
    pub async fn list_tasks(
        &self,
        page: u64,
        per_page: u64,
        filters: TaskFilters,
    ) -> Result<TaskListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = TaskEntity::find().order_by_desc(task::Column::CreatedAt);
        if let Some(order_id) = filters.order_id {
            query = query.filter(task::Column::OrderId.eq(order_id));
        }
        if let Some(employee_id) = filters.employee_id {
            query = query.filter(task::Column::AssignedEmployeeId.eq(employee_id));
        }
        if let Some(status) = filters.status {
            query = query.filter(task::Column::Status.eq(status.to_string()));
        }
        if let Some(stage) = filters.stage {
            query = query.filter(task::Column::Stage.eq(stage.to_string()));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let tasks = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(TaskListResponse {
            tasks: tasks.into_iter().map(model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// All tasks of one order, unpaginated; used by propagation and the
    /// order detail view.
    pub async fn tasks_for_order(&self, order_id: Uuid) -> Result<Vec<TaskModel>, ServiceError> {
        let db = &*self.db_pool;
        let tasks = TaskEntity::find()
            .filter(task::Column::OrderId.eq(order_id))
            .all(db)
            .await?;
        Ok(tasks)
    }

    /// Updates a task's execution status, optionally recording actual
    /// hours and notes. Callers are expected to follow up with an
    /// order-status propagation pass for the parent order.
    #[instrument(skip(self, request), fields(task_id = %task_id, new_status = %request.status))]
    pub async fn update_task_status(
        &self,
        task_id: Uuid,
        request: UpdateTaskStatusRequest,
    ) -> Result<TaskResponse, ServiceError> {
        let db = &*self.db_pool;
        let task = TaskEntity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Task {task_id} not found")))?;

        let old_status = task.status.clone();
        let mut active: TaskActiveModel = task.into();
        active.status = Set(request.status.to_string());
        if let Some(hours) = request.actual_hours {
            if hours < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "Actual hours must not be negative".to_string(),
                ));
            }
            active.actual_hours = Set(Some(hours));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;
        info!(task_id = %task_id, old_status = %old_status, new_status = %request.status, "task status updated");

        if let Some(sender) = &self.event_sender {
            let event = Event::TaskStatusChanged {
                task_id,
                old_status,
                new_status: request.status.to_string(),
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, task_id = %task_id, "failed to send task status event");
            }
        }

        Ok(model_to_response(updated))
    }

    /// Manual assignment override: binds the task to the given employee
    /// directly, bypassing the skill router.
    #[instrument(skip(self, notes), fields(task_id = %task_id, employee_id = %employee_id))]
    pub async fn assign_task(
        &self,
        task_id: Uuid,
        employee_id: Uuid,
        notes: Option<String>,
    ) -> Result<TaskResponse, ServiceError> {
        let db = &*self.db_pool;

        let task = TaskEntity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Task {task_id} not found")))?;

        let employee = EmployeeEntity::find_by_id(employee_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {employee_id} not found")))?;
        if !employee.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Employee {} is not active",
                employee.employee_number
            )));
        }

        let mut active: TaskActiveModel = task.into();
        active.assigned_employee_id = Set(Some(employee_id));
        if let Some(notes) = notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(task_id = %task_id, employee_id = %employee_id, "task assigned");

        if let Some(sender) = &self.event_sender {
            let event = Event::TaskAssigned {
                task_id,
                employee_id,
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, task_id = %task_id, "failed to send task assigned event");
            }
        }

        Ok(model_to_response(updated))
    }

    /// Deletes a task. Only pending tasks may be deleted.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn delete_task(&self, task_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let task = TaskEntity::find_by_id(task_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Task {task_id} not found")))?;

        if task.status != TaskStatus::Pending.to_string() {
            return Err(ServiceError::InvalidOperation(format!(
                "Only pending tasks can be deleted; task is '{}'",
                task.status
            )));
        }

        task.delete(db).await?;
        info!(task_id = %task_id, "task deleted");
        Ok(())
    }
}

pub(crate) fn model_to_response(model: TaskModel) -> TaskResponse {
    let overdue = is_task_overdue(&model, Utc::now());
    TaskResponse {
        id: model.id,
        order_id: model.order_id,
        stage: model.stage,
        status: model.status,
        priority: model.priority,
        assigned_employee_id: model.assigned_employee_id,
        required_skills: split_skills(model.required_skills.as_deref()),
        deadline: model.deadline,
        estimated_hours: model.estimated_hours,
        actual_hours: model.actual_hours,
        is_overdue: overdue,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
