use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::entities::material_usage::Model as UsageModel;
use crate::services::material_usage::{MaterialUsageSummary, RecordMaterialUsageRequest};
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/materials",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Recorded usage entry"),
        (status = 400, description = "Quantity must be positive", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn record_usage(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<RecordMaterialUsageRequest>,
) -> ApiResult<UsageModel> {
    let entry = state
        .services
        .material_usage
        .record_usage(order_id, request)
        .await?;
    Ok(Json(ApiResponse::success(entry)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/materials",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Usage entries for the order plus total cost")
    )
)]
pub async fn usage_for_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<MaterialUsageSummary> {
    let summary = state
        .services
        .material_usage
        .usage_for_order(order_id)
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/materials/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Usage entry id")),
    responses(
        (status = 200, description = "Usage entry deleted"),
        (status = 404, description = "Usage entry not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_usage(
    State(state): State<AppState>,
    Path(usage_id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.material_usage.delete_usage(usage_id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true, "usage_id": usage_id }),
    )))
}
