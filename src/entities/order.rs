use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Order number must be between 1 and 50 characters"
    ))]
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
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_history::Entity")]
    OrderHistory,
    #[sea_orm(has_many = "super::task::Entity")]
    Tasks,
    #[sea_orm(has_many = "super::material_usage::Entity")]
    MaterialUsage,
    #[sea_orm(has_many = "super::measurement::Entity")]
    Measurements,
}

impl Related<super::order_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderHistory.def()
    }
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::material_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaterialUsage.def()
    }
}

impl Related<super::measurement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Measurements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
