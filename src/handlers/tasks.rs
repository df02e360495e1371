use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::assignment::AssignmentOutcome;
use crate::services::tasks::{
    CreateTaskRequest, TaskFilters, TaskResponse, UpdateTaskStatusRequest,
};
use crate::workflow::{TaskStage, TaskStatus};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct TaskListFilters {
    pub order_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub stage: Option<TaskStage>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssignTaskBody {
    pub employee_id: Uuid,
    pub notes: Option<String>,
}

/// Task update plus the result of the follow-up order-status sync.
#[derive(Debug, Serialize)]
pub struct TaskStatusUpdateResponse {
    pub task: TaskResponse,
    /// True when the parent order's status changed as a result.
    pub order_status_updated: bool,
    pub derived_order_status: Option<String>,
    /// Present when the derived status conflicted with the transition
    /// table and the order was left untouched.
    pub sync_conflict: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "Tasks",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<u64>, Query, description = "Items per page"),
        ("order_id" = Option<Uuid>, Query, description = "Filter by parent order"),
        ("employee_id" = Option<Uuid>, Query, description = "Filter by assignee"),
        ("status" = Option<String>, Query, description = "Filter by task status"),
        ("stage" = Option<String>, Query, description = "Filter by workflow stage")
    ),
    responses(
        (status = 200, description = "Paginated list of tasks")
    )
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<TaskListFilters>,
) -> ApiResult<PaginatedResponse<TaskResponse>> {
    let result = state
        .services
        .tasks
        .list_tasks(
            query.page,
            query.limit,
            TaskFilters {
                order_id: filters.order_id,
                employee_id: filters.employee_id,
                status: filters.status,
                stage: filters.stage,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.tasks,
        result.total,
        result.page,
        result.per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task"),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TaskResponse> {
    let task = state
        .services
        .tasks
        .get_task(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Task {id} not found")))?;
    Ok(Json(ApiResponse::success(task)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "Tasks",
    responses(
        (status = 200, description = "Created task, initially pending and unassigned"),
        (status = 404, description = "Parent order not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<TaskResponse> {
    let task = state.services.tasks.create_task(request).await?;
    Ok(Json(ApiResponse::success(task)))
}

/// Updates a task's status, then re-derives the parent order's status
/// from its tasks. A derivation conflict does not fail the task update;
/// it is reported in the response and logged.
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}/status",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Updated task plus the order-status sync outcome"),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskStatusRequest>,
) -> ApiResult<TaskStatusUpdateResponse> {
    let task = state.services.tasks.update_task_status(id, request).await?;

    let mut response = TaskStatusUpdateResponse {
        order_status_updated: false,
        derived_order_status: None,
        sync_conflict: None,
        task,
    };

    match state
        .services
        .order_workflow
        .sync_from_tasks(response.task.order_id)
        .await
    {
        Ok(outcome) => {
            response.order_status_updated = outcome.applied;
            response.derived_order_status = Some(outcome.derived_status.to_string());
        }
        Err(ServiceError::InconsistentDerivedStatus { current, derived }) => {
            warn!(order_id = %response.task.order_id, %current, %derived,
                "order status sync conflict after task update");
            response.derived_order_status = Some(derived.to_string());
            response.sync_conflict = Some(format!(
                "Derived status '{derived}' is not a legal transition from '{current}'; order left unchanged"
            ));
        }
        Err(e) => return Err(e),
    }

    Ok(Json(ApiResponse::success(response)))
}

/// Manual assignment to a specific employee.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/assign",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task assigned to the given employee"),
        (status = 400, description = "Employee is not active", body = crate::errors::ErrorResponse)
    )
)]
pub async fn assign_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignTaskBody>,
) -> ApiResult<TaskResponse> {
    let task = state
        .services
        .tasks
        .assign_task(id, body.employee_id, body.notes)
        .await?;
    Ok(Json(ApiResponse::success(task)))
}

/// Auto-assignment through the skill router. "No suitable employee" is a
/// 200 with `success: false` in the outcome, not an error.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/auto-assign",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Assignment outcome", body = AssignmentOutcome),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn auto_assign_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AssignmentOutcome> {
    let outcome = state.services.assignment.auto_assign_task(id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted"),
        (status = 400, description = "Only pending tasks can be deleted", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.tasks.delete_task(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true, "task_id": id }),
    )))
}
