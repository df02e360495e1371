use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::purchase_order::Model as PurchaseOrderModel;
use crate::errors::ServiceError;
use crate::services::purchase_orders::{
    CreatePurchaseOrderRequest, PurchaseOrderStatus, UpdatePurchaseOrderStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct PurchaseOrderListFilters {
    pub supplier_id: Option<Uuid>,
    pub status: Option<PurchaseOrderStatus>,
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    tag = "Procurement",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<u64>, Query, description = "Items per page"),
        ("supplier_id" = Option<Uuid>, Query, description = "Filter by supplier"),
        ("status" = Option<String>, Query, description = "Filter by status (draft/ordered/received/cancelled)")
    ),
    responses(
        (status = 200, description = "Paginated list of purchase orders, newest first")
    )
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<PurchaseOrderListFilters>,
) -> ApiResult<PaginatedResponse<PurchaseOrderModel>> {
    let result = state
        .services
        .purchase_orders
        .list_purchase_orders(query.page, query.limit, filters.supplier_id, filters.status)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.purchase_orders,
        result.total,
        result.page,
        result.per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order"),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PurchaseOrderModel> {
    let po = state
        .services
        .purchase_orders
        .get_purchase_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {id} not found")))?;
    Ok(Json(ApiResponse::success(po)))
}

#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    tag = "Procurement",
    responses(
        (status = 200, description = "Created purchase order in draft status"),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseOrderRequest>,
) -> ApiResult<PurchaseOrderModel> {
    let po = state
        .services
        .purchase_orders
        .create_purchase_order(request)
        .await?;
    Ok(Json(ApiResponse::success(po)))
}

#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}/status",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "Purchase order id")),
    responses(
        (status = 200, description = "Purchase order after the status change"),
        (status = 400, description = "Illegal status change", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_purchase_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePurchaseOrderStatusRequest>,
) -> ApiResult<PurchaseOrderModel> {
    let po = state
        .services
        .purchase_orders
        .update_status(id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(po)))
}
