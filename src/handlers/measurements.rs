use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::entities::measurement::Model as MeasurementModel;
use crate::services::measurements::MeasurementInput;
use crate::{ApiResponse, ApiResult, AppState};

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/measurements",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Recorded measurement; re-recording the same name updates it"),
        (status = 400, description = "Value must be positive", body = crate::errors::ErrorResponse)
    )
)]
pub async fn record_measurement(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<MeasurementInput>,
) -> ApiResult<MeasurementModel> {
    let measurement = state
        .services
        .measurements
        .record_measurement(order_id, input)
        .await?;
    Ok(Json(ApiResponse::success(measurement)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/measurements",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Measurements for the order, ordered by name")
    )
)]
pub async fn measurements_for_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Vec<MeasurementModel>> {
    let measurements = state
        .services
        .measurements
        .measurements_for_order(order_id)
        .await?;
    Ok(Json(ApiResponse::success(measurements)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/measurements/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Measurement id")),
    responses(
        (status = 200, description = "Measurement deleted"),
        (status = 404, description = "Measurement not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_measurement(
    State(state): State<AppState>,
    Path(measurement_id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state
        .services
        .measurements
        .delete_measurement(measurement_id)
        .await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true, "measurement_id": measurement_id }),
    )))
}
