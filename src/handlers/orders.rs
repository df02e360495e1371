use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::order_history;
use crate::errors::ServiceError;
use crate::services::orders::{
    CreateOrderRequest, OrderFilters, OrderResponse, UpdateOrderDetails,
};
use crate::workflow::{OrderStatus, Priority};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct OrderListFilters {
    pub status: Option<OrderStatus>,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub overdue_only: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusBody {
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub acting_user: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CancelOrderBody {
    pub reason: Option<String>,
    pub acting_user: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<u64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("priority" = Option<String>, Query, description = "Filter by priority"),
        ("overdue_only" = Option<bool>, Query, description = "Only orders past their delivery date")
    ),
    responses(
        (status = 200, description = "Paginated list of orders")
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<OrderListFilters>,
) -> ApiResult<PaginatedResponse<OrderResponse>> {
    let result = state
        .services
        .orders
        .list_orders(
            query.page,
            query.limit,
            OrderFilters {
                status: filters.status,
                priority: filters.priority,
                overdue_only: filters.overdue_only,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.orders,
        result.total,
        result.page,
        result.per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with computed overdue flag"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/by-number/{order_number}",
    tag = "Orders",
    params(("order_number" = String, Path, description = "Human-facing order number, e.g. ORD-1A2B3C4D")),
    responses(
        (status = 200, description = "Order"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_order_by_number(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .get_order_by_number(&order_number)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {order_number} not found")))?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    responses(
        (status = 200, description = "Created order; status starts at received"),
        (status = 400, description = "Validation failure (e.g. deposit exceeds total)", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<OrderResponse> {
    let order = state.services.orders.create_order(request).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Updated order; status is never touched on this path"),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(details): Json<UpdateOrderDetails>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .update_order_details(id, details)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

/// Status transitions run through the workflow engine; illegal moves are
/// rejected with 400 and leave no history row.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order after the transition, with one new history row"),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusBody>,
) -> ApiResult<OrderResponse> {
    let model = state
        .services
        .order_workflow
        .update_status(id, body.status, body.notes, body.acting_user)
        .await?;
    Ok(Json(ApiResponse::success(
        state.services.orders.model_to_response(model),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cancelled order"),
        (status = 400, description = "Order is already terminal", body = crate::errors::ErrorResponse)
    )
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CancelOrderBody>,
) -> ApiResult<OrderResponse> {
    let model = state
        .services
        .order_workflow
        .cancel_order(id, body.reason, body.acting_user)
        .await?;
    Ok(Json(ApiResponse::success(
        state.services.orders.model_to_response(model),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/history",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Append-only status history, oldest first")
    )
)]
pub async fn get_order_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<order_history::Model>> {
    let history = state.services.orders.get_order_history(id).await?;
    Ok(Json(ApiResponse::success(history)))
}
