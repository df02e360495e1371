use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::purchase_order::{
        self, ActiveModel as PurchaseOrderActiveModel, Entity as PurchaseOrderEntity,
        Model as PurchaseOrderModel,
    },
    entities::supplier::Entity as SupplierEntity,
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Procurement status chain: draft -> ordered -> received, with
/// cancellation possible until goods arrive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    utoipa::ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn can_transition_to(self, target: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, target),
            (Draft, Ordered) | (Draft, Cancelled) | (Ordered, Received) | (Ordered, Cancelled)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatePurchaseOrderRequest {
    pub supplier_id: Uuid,
    pub expected_date: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdatePurchaseOrderStatusRequest {
    pub status: PurchaseOrderStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseOrderListResponse {
    pub purchase_orders: Vec<PurchaseOrderModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PurchaseOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(supplier_id = %request.supplier_id))]
    pub async fn create_purchase_order(
        &self,
        request: CreatePurchaseOrderRequest,
    ) -> Result<PurchaseOrderModel, ServiceError> {
        if request.total_amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Total amount cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        SupplierEntity::find_by_id(request.supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supplier {} not found", request.supplier_id))
            })?;

        let now = Utc::now();
        let active = PurchaseOrderActiveModel {
            id: Set(Uuid::new_v4()),
            po_number: Set(generate_po_number()),
            supplier_id: Set(request.supplier_id),
            status: Set(PurchaseOrderStatus::Draft.to_string()),
            order_date: Set(now),
            expected_date: Set(request.expected_date),
            total_amount: Set(request.total_amount),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = active.insert(db).await?;
        info!(purchase_order_id = %model.id, po_number = %model.po_number, "purchase order created");
        Ok(model)
    }

    #[instrument(skip(self), fields(purchase_order_id = %purchase_order_id))]
    pub async fn get_purchase_order(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Option<PurchaseOrderModel>, ServiceError> {
        let db = &*self.db_pool;
        Ok(PurchaseOrderEntity::find_by_id(purchase_order_id)
            .one(db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
        page: u64,
        per_page: u64,
        supplier_id: Option<Uuid>,
        status: Option<PurchaseOrderStatus>,
    ) -> Result<PurchaseOrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query =
            PurchaseOrderEntity::find().order_by_desc(purchase_order::Column::OrderDate);
        if let Some(supplier_id) = supplier_id {
            query = query.filter(purchase_order::Column::SupplierId.eq(supplier_id));
        }
        if let Some(status) = status {
            query = query.filter(purchase_order::Column::Status.eq(status.to_string()));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let purchase_orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(PurchaseOrderListResponse {
            purchase_orders,
            total,
            page,
            per_page,
        })
    }

    /// Moves a purchase order along its status chain. Illegal jumps
    /// (e.g. draft -> received, or any move off a terminal status) are
    /// rejected.
    #[instrument(skip(self), fields(purchase_order_id = %purchase_order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        purchase_order_id: Uuid,
        new_status: PurchaseOrderStatus,
    ) -> Result<PurchaseOrderModel, ServiceError> {
        let db = &*self.db_pool;
        let model = PurchaseOrderEntity::find_by_id(purchase_order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {purchase_order_id} not found"))
            })?;

        let current = PurchaseOrderStatus::from_str(&model.status).map_err(|_| {
            ServiceError::InvalidStatus(format!(
                "Purchase order has unknown status '{}'",
                model.status
            ))
        })?;

        if !current.can_transition_to(new_status) {
            warn!(%current, %new_status, "rejected purchase order status change");
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot move purchase order from '{current}' to '{new_status}'"
            )));
        }

        let mut active: PurchaseOrderActiveModel = model.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(db).await?;

        info!(purchase_order_id = %purchase_order_id, from = %current, to = %new_status,
            "purchase order status updated");

        if let Some(sender) = &self.event_sender {
            let event = Event::PurchaseOrderStatusChanged {
                purchase_order_id,
                old_status: current.to_string(),
                new_status: new_status.to_string(),
            };
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send purchase order status event");
            }
        }

        Ok(updated)
    }
}

fn generate_po_number() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("PO-{}", &id[..8])
}
