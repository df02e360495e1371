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
    entities::measurement::{
        self, ActiveModel as MeasurementActiveModel, Entity as MeasurementEntity,
        Model as MeasurementModel,
    },
    entities::order::Entity as OrderEntity,
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct MeasurementInput {
    /// e.g. "chest", "waist", "sleeve_length"
    #[validate(length(min = 1, max = 60, message = "Measurement name is required"))]
    pub name: String,
    pub value_cm: Decimal,
    pub notes: Option<String>,
}

/// Customer measurements recorded per order.
#[derive(Clone)]
pub struct MeasurementService {
    db_pool: Arc<DbPool>,
}

impl MeasurementService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Records a measurement for an order. Re-recording a name that
    /// already exists updates the stored value instead of duplicating it.
    #[instrument(skip(self, input), fields(order_id = %order_id, name = %input.name))]
    pub async fn record_measurement(
        &self,
        order_id: Uuid,
        input: MeasurementInput,
    ) -> Result<MeasurementModel, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if input.value_cm <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Measurement value must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;
        OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        let now = Utc::now();
        let existing = MeasurementEntity::find()
            .filter(measurement::Column::OrderId.eq(order_id))
            .filter(measurement::Column::Name.eq(input.name.clone()))
            .one(db)
            .await?;

        let model = match existing {
            Some(current) => {
                let mut active: MeasurementActiveModel = current.into();
                active.value_cm = Set(input.value_cm);
                active.notes = Set(input.notes);
                active.updated_at = Set(Some(now));
                active.update(db).await?
            }
            None => {
                let active = MeasurementActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_id: Set(order_id),
                    name: Set(input.name),
                    value_cm: Set(input.value_cm),
                    notes: Set(input.notes),
                    created_at: Set(now),
                    updated_at: Set(Some(now)),
                };
                active.insert(db).await?
            }
        };

        info!(measurement_id = %model.id, "measurement recorded");
        Ok(model)
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn measurements_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<MeasurementModel>, ServiceError> {
        let db = &*self.db_pool;
        OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {order_id} not found")))?;

        Ok(MeasurementEntity::find()
            .filter(measurement::Column::OrderId.eq(order_id))
            .order_by_asc(measurement::Column::Name)
            .all(db)
            .await?)
    }

    #[instrument(skip(self), fields(measurement_id = %measurement_id))]
    pub async fn delete_measurement(&self, measurement_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let model = MeasurementEntity::find_by_id(measurement_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Measurement {measurement_id} not found"))
            })?;

        model.delete(db).await?;
        info!(measurement_id = %measurement_id, "measurement deleted");
        Ok(())
    }
}
