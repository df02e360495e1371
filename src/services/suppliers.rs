use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::supplier::{
        self, ActiveModel as SupplierActiveModel, Entity as SupplierEntity, Model as SupplierModel,
    },
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 120, message = "Supplier name is required"))]
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SupplierListResponse {
    pub suppliers: Vec<SupplierModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_supplier(
        &self,
        request: CreateSupplierRequest,
    ) -> Result<SupplierModel, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let active = SupplierActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            contact_person: Set(request.contact_person),
            phone: Set(request.phone),
            email: Set(request.email),
            address: Set(request.address),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let model = active.insert(db).await?;
        info!(supplier_id = %model.id, "supplier created");
        Ok(model)
    }

    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    pub async fn get_supplier(
        &self,
        supplier_id: Uuid,
    ) -> Result<Option<SupplierModel>, ServiceError> {
        let db = &*self.db_pool;
        Ok(SupplierEntity::find_by_id(supplier_id).one(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        page: u64,
        per_page: u64,
        include_inactive: bool,
    ) -> Result<SupplierListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = SupplierEntity::find().order_by_asc(supplier::Column::Name);
        if !include_inactive {
            query = query.filter(supplier::Column::IsActive.eq(true));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let suppliers = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(SupplierListResponse {
            suppliers,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(supplier_id = %supplier_id))]
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        request: UpdateSupplierRequest,
    ) -> Result<SupplierModel, ServiceError> {
        let db = &*self.db_pool;
        let model = SupplierEntity::find_by_id(supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {supplier_id} not found")))?;

        let mut active: SupplierActiveModel = model.into();
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Supplier name cannot be empty".to_string(),
                ));
            }
            active.name = Set(name);
        }
        if let Some(contact_person) = request.contact_person {
            active.contact_person = Set(Some(contact_person));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Some(Utc::now()));

        Ok(active.update(db).await?)
    }

    /// Soft-deactivates a supplier; purchase order history stays intact.
    #[instrument(skip(self), fields(supplier_id = %supplier_id))]
    pub async fn deactivate_supplier(&self, supplier_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let model = SupplierEntity::find_by_id(supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {supplier_id} not found")))?;

        let mut active: SupplierActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await?;

        info!(supplier_id = %supplier_id, "supplier deactivated");
        Ok(())
    }
}
