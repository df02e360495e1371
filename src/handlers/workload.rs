use axum::{extract::State, response::Json};

use crate::services::workload::{EmployeeWorkload, WorkloadReport};
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/workload",
    tag = "Workload",
    responses(
        (status = 200, description = "Workload report with per-employee utilization and task distribution", body = WorkloadReport)
    )
)]
pub async fn workload_report(State(state): State<AppState>) -> ApiResult<WorkloadReport> {
    let report = state.services.workload.workload_report().await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/workload/employees",
    tag = "Workload",
    responses(
        (status = 200, description = "Per-employee workload summaries", body = Vec<EmployeeWorkload>)
    )
)]
pub async fn employee_workloads(
    State(state): State<AppState>,
) -> ApiResult<Vec<EmployeeWorkload>> {
    let workloads = state.services.workload.employee_workloads().await?;
    Ok(Json(ApiResponse::success(workloads)))
}
