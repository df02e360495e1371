use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::supplier::Model as SupplierModel;
use crate::errors::ServiceError;
use crate::services::suppliers::{CreateSupplierRequest, UpdateSupplierRequest};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize)]
pub struct SupplierListFilters {
    #[serde(default)]
    pub include_inactive: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    tag = "Procurement",
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<u64>, Query, description = "Items per page"),
        ("include_inactive" = Option<bool>, Query, description = "Include deactivated suppliers")
    ),
    responses(
        (status = 200, description = "Paginated list of suppliers")
    )
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<SupplierListFilters>,
) -> ApiResult<PaginatedResponse<SupplierModel>> {
    let result = state
        .services
        .suppliers
        .list_suppliers(query.page, query.limit, filters.include_inactive)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.suppliers,
        result.total,
        result.page,
        result.per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier"),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SupplierModel> {
    let supplier = state
        .services
        .suppliers
        .get_supplier(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Supplier {id} not found")))?;
    Ok(Json(ApiResponse::success(supplier)))
}

#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    tag = "Procurement",
    responses(
        (status = 200, description = "Created supplier"),
        (status = 400, description = "Validation failure", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(request): Json<CreateSupplierRequest>,
) -> ApiResult<SupplierModel> {
    let supplier = state.services.suppliers.create_supplier(request).await?;
    Ok(Json(ApiResponse::success(supplier)))
}

#[utoipa::path(
    put,
    path = "/api/v1/suppliers/{id}",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Updated supplier"),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSupplierRequest>,
) -> ApiResult<SupplierModel> {
    let supplier = state
        .services
        .suppliers
        .update_supplier(id, request)
        .await?;
    Ok(Json(ApiResponse::success(supplier)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{id}",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier deactivated; purchase order history stays intact")
    )
)]
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state.services.suppliers.deactivate_supplier(id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deactivated": true, "supplier_id": id }),
    )))
}
