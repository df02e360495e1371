use crate::{
    db::DbPool,
    entities::employee::{
        self, ActiveModel as EmployeeActiveModel, Entity as EmployeeEntity, Model as EmployeeModel,
    },
    entities::employee_skill::{
        self, ActiveModel as SkillActiveModel, Entity as SkillEntity,
    },
    entities::employee_specialization::{
        self, ActiveModel as SpecializationActiveModel, Entity as SpecializationEntity,
    },
    errors::ServiceError,
    workflow::TaskStage,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct SkillInput {
    #[validate(length(min = 1, max = 60))]
    pub skill_name: String,
    #[validate(range(min = 1, max = 5))]
    pub proficiency: i16,
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 30, message = "Employee number is required"))]
    pub employee_number: String,
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 60))]
    pub role: String,
    pub capacity: Option<i32>,
    pub monthly_salary: Option<Decimal>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub skills: Vec<SkillInput>,
    #[serde(default)]
    pub specializations: Vec<TaskStage>,
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub capacity: Option<i32>,
    pub monthly_salary: Option<Decimal>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub employee_number: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub capacity: Option<i32>,
    pub monthly_salary: Option<Decimal>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub skills: Vec<SkillInput>,
    pub specializations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmployeeListResponse {
    pub employees: Vec<EmployeeResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for managing employees, their skills and stage specializations.
#[derive(Clone)]
pub struct EmployeeService {
    db_pool: Arc<DbPool>,
}

impl EmployeeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(employee_number = %request.employee_number))]
    pub async fn create_employee(
        &self,
        request: CreateEmployeeRequest,
    ) -> Result<EmployeeResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        for skill in &request.skills {
            skill
                .validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }

        let db = &*self.db_pool;

        let duplicate = EmployeeEntity::find()
            .filter(employee::Column::EmployeeNumber.eq(request.employee_number.clone()))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Employee number {} already exists",
                request.employee_number
            )));
        }

        let now = Utc::now();
        let employee_id = Uuid::new_v4();
        let txn = db.begin().await?;

        let active = EmployeeActiveModel {
            id: Set(employee_id),
            employee_number: Set(request.employee_number),
            name: Set(request.name),
            role: Set(request.role),
            is_active: Set(true),
            capacity: Set(request.capacity),
            monthly_salary: Set(request.monthly_salary),
            phone: Set(request.phone),
            email: Set(request.email),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let model = active.insert(&txn).await?;

        for skill in &request.skills {
            let skill_active = SkillActiveModel {
                id: Set(Uuid::new_v4()),
                employee_id: Set(employee_id),
                skill_name: Set(skill.skill_name.clone()),
                proficiency: Set(skill.proficiency),
            };
            skill_active.insert(&txn).await?;
        }
        for stage in &request.specializations {
            let spec_active = SpecializationActiveModel {
                id: Set(Uuid::new_v4()),
                employee_id: Set(employee_id),
                stage: Set(stage.to_string()),
            };
            spec_active.insert(&txn).await?;
        }

        txn.commit().await?;
        info!(employee_id = %employee_id, "employee created");

        self.build_response(model).await
    }

    #[instrument(skip(self), fields(employee_id = %employee_id))]
    pub async fn get_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<EmployeeResponse>, ServiceError> {
        let db = &*self.db_pool;
        match EmployeeEntity::find_by_id(employee_id).one(db).await? {
            Some(model) => Ok(Some(self.build_response(model).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_employees(
        &self,
        page: u64,
        per_page: u64,
        include_inactive: bool,
    ) -> Result<EmployeeListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = EmployeeEntity::find().order_by_asc(employee::Column::EmployeeNumber);
        if !include_inactive {
            query = query.filter(employee::Column::IsActive.eq(true));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut employees = Vec::with_capacity(models.len());
        for model in models {
            employees.push(self.build_response(model).await?);
        }

        Ok(EmployeeListResponse {
            employees,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(employee_id = %employee_id))]
    pub async fn update_employee(
        &self,
        employee_id: Uuid,
        request: UpdateEmployeeRequest,
    ) -> Result<EmployeeResponse, ServiceError> {
        let db = &*self.db_pool;
        let model = EmployeeEntity::find_by_id(employee_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {employee_id} not found")))?;

        let mut active: EmployeeActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(role) = request.role {
            active.role = Set(role);
        }
        if let Some(capacity) = request.capacity {
            if capacity < 1 {
                return Err(ServiceError::ValidationError(
                    "Capacity must be at least 1".to_string(),
                ));
            }
            active.capacity = Set(Some(capacity));
        }
        if let Some(salary) = request.monthly_salary {
            active.monthly_salary = Set(Some(salary));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await?;
        self.build_response(updated).await
    }

    /// Soft-deactivates an employee. Existing task assignments keep their
    /// back-references; the employee simply stops receiving new work.
    #[instrument(skip(self), fields(employee_id = %employee_id))]
    pub async fn deactivate_employee(&self, employee_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let model = EmployeeEntity::find_by_id(employee_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {employee_id} not found")))?;

        let mut active: EmployeeActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        info!(employee_id = %employee_id, "employee deactivated");
        Ok(())
    }

    /// Replaces the employee's skill set.
    #[instrument(skip(self, skills), fields(employee_id = %employee_id))]
    pub async fn replace_skills(
        &self,
        employee_id: Uuid,
        skills: Vec<SkillInput>,
    ) -> Result<EmployeeResponse, ServiceError> {
        for skill in &skills {
            skill
                .validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }

        let db = &*self.db_pool;
        let model = EmployeeEntity::find_by_id(employee_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {employee_id} not found")))?;

        let txn = db.begin().await?;
        SkillEntity::delete_many()
            .filter(employee_skill::Column::EmployeeId.eq(employee_id))
            .exec(&txn)
            .await?;
        for skill in &skills {
            let active = SkillActiveModel {
                id: Set(Uuid::new_v4()),
                employee_id: Set(employee_id),
                skill_name: Set(skill.skill_name.clone()),
                proficiency: Set(skill.proficiency),
            };
            active.insert(&txn).await?;
        }
        txn.commit().await?;

        self.build_response(model).await
    }

    /// Replaces the employee's stage specializations.
    #[instrument(skip(self, stages), fields(employee_id = %employee_id))]
    pub async fn replace_specializations(
        &self,
        employee_id: Uuid,
        stages: Vec<TaskStage>,
    ) -> Result<EmployeeResponse, ServiceError> {
        let db = &*self.db_pool;
        let model = EmployeeEntity::find_by_id(employee_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Employee {employee_id} not found")))?;

        let txn = db.begin().await?;
        SpecializationEntity::delete_many()
            .filter(employee_specialization::Column::EmployeeId.eq(employee_id))
            .exec(&txn)
            .await?;
        for stage in &stages {
            let active = SpecializationActiveModel {
                id: Set(Uuid::new_v4()),
                employee_id: Set(employee_id),
                stage: Set(stage.to_string()),
            };
            active.insert(&txn).await?;
        }
        txn.commit().await?;

        self.build_response(model).await
    }

    async fn build_response(&self, model: EmployeeModel) -> Result<EmployeeResponse, ServiceError> {
        let db = &*self.db_pool;

        let skills = SkillEntity::find()
            .filter(employee_skill::Column::EmployeeId.eq(model.id))
            .all(db)
            .await?
            .into_iter()
            .map(|s| SkillInput {
                skill_name: s.skill_name,
                proficiency: s.proficiency,
            })
            .collect();

        let specializations = SpecializationEntity::find()
            .filter(employee_specialization::Column::EmployeeId.eq(model.id))
            .all(db)
            .await?
            .into_iter()
            .map(|s| s.stage)
            .collect();

        Ok(EmployeeResponse {
            id: model.id,
            employee_number: model.employee_number,
            name: model.name,
            role: model.role,
            is_active: model.is_active,
            capacity: model.capacity,
            monthly_salary: model.monthly_salary,
            phone: model.phone,
            email: model.email,
            skills,
            specializations,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
