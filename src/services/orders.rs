use crate::{
    entities::order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel,
    },
    entities::order_history::{self, Entity as OrderHistoryEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    workflow::{OrderStatus, Priority},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 120, message = "Customer name is required"))]
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub priority: Priority,
    #[validate(length(min = 1, max = 60, message = "Garment type is required"))]
    pub garment_type: String,
    pub service_description: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    #[serde(default)]
    pub is_urgent: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrderDetails {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub garment_type: Option<String>,
    pub service_description: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub total_amount: Option<Decimal>,
    pub deposit_amount: Option<Decimal>,
    pub is_urgent: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub status: String,
    pub priority: String,
    pub garment_type: String,
    pub service_description: Option<String>,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub balance_amount: Decimal,
    pub is_urgent: bool,
    /// Computed at read time from (delivery_date, status, now); never stored.
    pub is_overdue: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default, Clone)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub priority: Option<Priority>,
    pub overdue_only: bool,
}

/// Validates the monetary invariant (deposit <= total, both non-negative)
/// and returns the derived balance.
pub(crate) fn compute_balance(total: Decimal, deposit: Decimal) -> Result<Decimal, ServiceError> {
    if total < Decimal::ZERO || deposit < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Amounts must not be negative".to_string(),
        ));
    }
    if deposit > total {
        return Err(ServiceError::ValidationError(format!(
            "Deposit amount ({deposit}) must not exceed total amount ({total})"
        )));
    }
    Ok(total - deposit)
}

/// True when the order is past its delivery date and still open.
pub(crate) fn is_overdue(model: &OrderModel, now: DateTime<Utc>) -> bool {
    let open = OrderStatus::from_str(&model.status)
        .map(|s| s.is_open())
        .unwrap_or(false);
    matches!(model.delivery_date, Some(due) if due < now) && open
}

/// Service for managing tailoring orders.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a new order. Orders always start in RECEIVED.
    #[instrument(skip(self, request), fields(customer_name = %request.customer_name))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let balance = compute_balance(request.total_amount, request.deposit_amount)?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order_number = generate_order_number();

        let active = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(order_number),
            customer_name: Set(request.customer_name.clone()),
            customer_phone: Set(request.customer_phone),
            status: Set(OrderStatus::Received.to_string()),
            priority: Set(request.priority.to_string()),
            garment_type: Set(request.garment_type),
            service_description: Set(request.service_description),
            order_date: Set(now),
            delivery_date: Set(request.delivery_date),
            total_amount: Set(request.total_amount),
            deposit_amount: Set(request.deposit_amount),
            balance_amount: Set(balance),
            is_urgent: Set(request.is_urgent),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        };

        let model = active.insert(db).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to create order");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, order_number = %model.order_number, "order created");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::OrderCreated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "failed to send order created event");
            }
        }

        Ok(self.model_to_response(model))
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;
        let order = OrderEntity::find_by_id(order_id).one(db).await?;
        Ok(order.map(|m| self.model_to_response(m)))
    }

    pub async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;
        let order = OrderEntity::find()
            .filter(order::Column::OrderNumber.eq(order_number))
            .one(db)
            .await?;
        Ok(order.map(|m| self.model_to_response(m)))
    }

    /// Lists orders with pagination and optional status/priority/overdue
    /// filters. Overdue filtering happens after the page fetch since it is
    /// a computed predicate, not a column.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        filters: OrderFilters,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = filters.status {
            query = query.filter(order::Column::Status.eq(status.to_string()));
        }
        if let Some(priority) = filters.priority {
            query = query.filter(order::Column::Priority.eq(priority.to_string()));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut responses: Vec<OrderResponse> = orders
            .into_iter()
            .map(|m| self.model_to_response(m))
            .collect();
        if filters.overdue_only {
            responses.retain(|o| o.is_overdue);
        }

        Ok(OrderListResponse {
            orders: responses,
            total,
            page,
            per_page,
        })
    }

    /// Updates non-status order details. Status changes go through the
    /// workflow engine only.
    #[instrument(skip(self, details), fields(order_id = %order_id))]
    pub async fn update_order_details(
        &self,
        order_id: Uuid,
        details: UpdateOrderDetails,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let total = details.total_amount.unwrap_or(order.total_amount);
        let deposit = details.deposit_amount.unwrap_or(order.deposit_amount);
        let balance = compute_balance(total, deposit)?;

        let current_version = order.version;
        let mut active: OrderActiveModel = order.into();
        if let Some(name) = details.customer_name {
            active.customer_name = Set(name);
        }
        if let Some(phone) = details.customer_phone {
            active.customer_phone = Set(Some(phone));
        }
        if let Some(garment) = details.garment_type {
            active.garment_type = Set(garment);
        }
        if let Some(desc) = details.service_description {
            active.service_description = Set(Some(desc));
        }
        if let Some(due) = details.delivery_date {
            active.delivery_date = Set(Some(due));
        }
        if let Some(urgent) = details.is_urgent {
            active.is_urgent = Set(urgent);
        }
        if let Some(notes) = details.notes {
            active.notes = Set(Some(notes));
        }
        active.total_amount = Set(total);
        active.deposit_amount = Set(deposit);
        active.balance_amount = Set(balance);
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(current_version + 1);

        let updated = active.update(db).await?;
        info!(order_id = %order_id, "order details updated");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::OrderUpdated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "failed to send order updated event");
            }
        }

        Ok(self.model_to_response(updated))
    }

    /// Returns the append-only status history, oldest first.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order_history(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_history::Model>, ServiceError> {
        let db = &*self.db_pool;
        let exists = OrderEntity::find_by_id(order_id).one(db).await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!("Order {order_id} not found")));
        }
        let entries = OrderHistoryEntity::find()
            .filter(order_history::Column::OrderId.eq(order_id))
            .order_by_asc(order_history::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(entries)
    }

    pub(crate) fn model_to_response(&self, model: OrderModel) -> OrderResponse {
        let overdue = is_overdue(&model, Utc::now());
        OrderResponse {
            id: model.id,
            order_number: model.order_number,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            status: model.status,
            priority: model.priority,
            garment_type: model.garment_type,
            service_description: model.service_description,
            order_date: model.order_date,
            delivery_date: model.delivery_date,
            total_amount: model.total_amount,
            deposit_amount: model.deposit_amount,
            balance_amount: model.balance_amount,
            is_urgent: model.is_urgent,
            is_overdue: overdue,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        }
    }
}

fn generate_order_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("ORD-{suffix}")
}
