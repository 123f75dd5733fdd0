use crate::db::{self, DbPool};
use crate::entities::{warehouse, RecordStatus};
use crate::errors::{classify_db_error, ServiceError};
use crate::services::concurrency::{guarded_update, VersionedUpdate};
use crate::services::unique_validation::{ensure_unique, normalize_code};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewWarehouse {
    pub warehouse_name: String,
    pub warehouse_type: String,
    pub phone_no: Option<String>,
}

/// Full replacement of a warehouse's editable fields.
#[derive(Debug, Clone)]
pub struct WarehouseChanges {
    pub version_nbr: i32,
    pub warehouse_name: String,
    pub warehouse_type: String,
    pub phone_no: Option<String>,
    pub status_code: RecordStatus,
}

/// Loads a warehouse that may take part in new packages or agencies.
pub(crate) async fn active_warehouse<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: Uuid,
) -> Result<warehouse::Model, ServiceError> {
    let warehouse = warehouse::Entity::find_by_id(warehouse_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", warehouse_id)))?;
    if !warehouse.is_active() {
        return Err(ServiceError::ValidationError(format!(
            "Warehouse {} is inactive",
            warehouse.warehouse_name
        )));
    }
    Ok(warehouse)
}

#[derive(Clone)]
pub struct WarehouseService {
    db_pool: Arc<DbPool>,
}

impl WarehouseService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create_warehouse(
        &self,
        input: NewWarehouse,
        actor: &str,
    ) -> Result<warehouse::Model, ServiceError> {
        let name = normalize_code("Warehouse name", &input.warehouse_name)?;
        let txn = db::begin(&self.db_pool, "warehouse.create").await?;
        ensure_unique::<warehouse::Entity, _>(
            &txn,
            warehouse::Column::WarehouseName,
            &name,
            None,
            "Warehouse name",
        )
        .await?;

        let created = warehouse::ActiveModel {
            warehouse_name: Set(name),
            warehouse_type: Set(input.warehouse_type.trim().to_uppercase()),
            phone_no: Set(input.phone_no),
            status_code: Set(RecordStatus::Active),
            create_by_id: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(classify_db_error)?;
        db::commit(txn, "warehouse.create").await?;

        info!(warehouse_id = %created.id, name = %created.warehouse_name, "Warehouse created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, id: Uuid) -> Result<warehouse::Model, ServiceError> {
        warehouse::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(
        &self,
        status: Option<RecordStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<warehouse::Model>, u64), ServiceError> {
        let mut query = warehouse::Entity::find();
        if let Some(status) = status {
            query = query.filter(warehouse::Column::StatusCode.eq(status));
        }
        let paginator = query
            .order_by_asc(warehouse::Column::WarehouseName)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let warehouses = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((warehouses, total))
    }

    #[instrument(skip(self))]
    pub async fn update_warehouse(
        &self,
        id: Uuid,
        changes: WarehouseChanges,
        actor: &str,
    ) -> Result<warehouse::Model, ServiceError> {
        let name = normalize_code("Warehouse name", &changes.warehouse_name)?;
        let txn = db::begin(&self.db_pool, "warehouse.update").await?;
        warehouse::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", id)))?;
        ensure_unique::<warehouse::Entity, _>(
            &txn,
            warehouse::Column::WarehouseName,
            &name,
            Some(id),
            "Warehouse name",
        )
        .await?;

        let update = VersionedUpdate::<warehouse::Entity>::new()
            .set(warehouse::Column::WarehouseName, name)
            .set(
                warehouse::Column::WarehouseType,
                changes.warehouse_type.trim().to_uppercase(),
            )
            .set(warehouse::Column::PhoneNo, changes.phone_no)
            .set(warehouse::Column::StatusCode, changes.status_code);
        guarded_update(&txn, id, changes.version_nbr, actor, update).await?;

        let updated = warehouse::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Warehouse {} not found", id)))?;
        db::commit(txn, "warehouse.update").await?;

        info!(warehouse_id = %id, version = updated.version_nbr, "Warehouse updated");
        Ok(updated)
    }
}
