use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 30))]
    pub employee_number: String,

    #[validate(length(min = 1, max = 120))]
    pub name: String,

    pub role: String,
    pub is_active: bool,
    /// Maximum concurrent active tasks; NULL falls back to the configured
    /// default capacity.
    pub capacity: Option<i32>,
    pub monthly_salary: Option<Decimal>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_skill::Entity")]
    Skills,
    #[sea_orm(has_many = "super::employee_specialization::Entity")]
    Specializations,
    #[sea_orm(has_many = "super::task::Entity")]
    Tasks,
}

impl Related<super::employee_skill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Skills.def()
    }
}

impl Related<super::employee_specialization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Specializations.def()
    }
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
