use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::material_usage::{
        self, ActiveModel as UsageActiveModel, Entity as UsageEntity, Model as UsageModel,
    },
    entities::order::Entity as OrderEntity,
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct RecordMaterialUsageRequest {
    #[validate(length(min = 1, max = 120, message = "Material name is required"))]
    pub material_name: String,
    pub quantity: Decimal,
    #[validate(length(min = 1, max = 20, message = "Unit is required"))]
    pub unit: String,
    pub unit_cost: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaterialUsageSummary {
    pub entries: Vec<UsageModel>,
    /// Sum of quantity * unit_cost across all entries.
    pub total_cost: Decimal,
}

/// Records material consumption against orders for costing.
#[derive(Clone)]
pub struct MaterialUsageService {
    db_pool: Arc<DbPool>,
}

impl MaterialUsageService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(order_id = %order_id, material = %request.material_name))]
    pub async fn record_usage(
        &self,
        order_id: Uuid,
        request: RecordMaterialUsageRequest,
    ) -> Result<UsageModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }
        if request.unit_cost < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Unit cost cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let active = UsageActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            material_name: Set(request.material_name),
            quantity: Set(request.quantity),
            unit: Set(request.unit),
            unit_cost: Set(request.unit_cost),
            notes: Set(request.notes),
            recorded_at: Set(Utc::now()),
        };

        let model = active.insert(db).await?;
        info!(usage_id = %model.id, "material usage recorded");
        Ok(model)
    }

    /// All usage entries for an order plus their total cost.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn usage_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<MaterialUsageSummary, ServiceError> {
        let db = &*self.db_pool;
        OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let entries = UsageEntity::find()
            .filter(material_usage::Column::OrderId.eq(order_id))
            .order_by_asc(material_usage::Column::RecordedAt)
            .all(db)
            .await?;

        let total_cost = entries
            .iter()
            .map(|e| e.quantity * e.unit_cost)
            .sum::<Decimal>();

        Ok(MaterialUsageSummary {
            entries,
            total_cost,
        })
    }

    #[instrument(skip(self), fields(usage_id = %usage_id))]
    pub async fn delete_usage(&self, usage_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let model = UsageEntity::find_by_id(usage_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Material usage entry {usage_id} not found"))
            })?;

        model.delete(db).await?;
        info!(usage_id = %usage_id, "material usage entry deleted");
        Ok(())
    }
}
