use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::employees::{
    CreateEmployeeRequest, EmployeeResponse, SkillInput, UpdateEmployeeRequest,
};
use crate::workflow::TaskStage;
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct EmployeeListFilters {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReplaceSkillsBody {
    pub skills: Vec<SkillInput>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReplaceSpecializationsBody {
    pub specializations: Vec<TaskStage>,
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    tag = "Employees",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<u64>, Query, description = "Items per page"),
        ("include_inactive" = Option<bool>, Query, description = "Include deactivated employees")
    ),
    responses(
        (status = 200, description = "Paginated list of employees with skills and specializations")
    )
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<EmployeeListFilters>,
) -> ApiResult<PaginatedResponse<EmployeeResponse>> {
    let result = state
        .services
        .employees
        .list_employees(query.page, query.limit, filters.include_inactive)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.employees,
        result.total,
        result.page,
        result.per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee"),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<EmployeeResponse> {
    let employee = state
        .services
        .employees
        .get_employee(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Employee {id} not found")))?;
    Ok(Json(ApiResponse::success(employee)))
}

#[utoipa::path(
    post,
    path = "/api/v1/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Created employee"),
        (status = 409, description = "Employee number already exists", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> ApiResult<EmployeeResponse> {
    let employee = state.services.employees.create_employee(request).await?;
    Ok(Json(ApiResponse::success(employee)))
}

#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Updated employee"),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> ApiResult<EmployeeResponse> {
    let employee = state
        .services
        .employees
        .update_employee(id, request)
        .await?;
    Ok(Json(ApiResponse::success(employee)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deactivated; history and assignments are preserved")
    )
)]
pub async fn deactivate_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.employees.deactivate_employee(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deactivated": true, "employee_id": id }),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}/skills",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee with the replaced skill set")
    )
)]
pub async fn replace_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReplaceSkillsBody>,
) -> ApiResult<EmployeeResponse> {
    let employee = state
        .services
        .employees
        .replace_skills(id, body.skills)
        .await?;
    Ok(Json(ApiResponse::success(employee)))
}

#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}/specializations",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee with the replaced specializations")
    )
)]
pub async fn replace_specializations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReplaceSpecializationsBody>,
) -> ApiResult<EmployeeResponse> {
    let employee = state
        .services
        .employees
        .replace_specializations(id, body.specializations)
        .await?;
    Ok(Json(ApiResponse::success(employee)))
}
