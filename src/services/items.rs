use crate::db::{self, DbPool};
use crate::entities::{item, RecordStatus};
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
pub struct NewItem {
    pub item_name: String,
    pub sku_code: String,
    pub item_desc: Option<String>,
    pub reorder_qty: i64,
}

#[derive(Debug, Clone)]
pub struct ItemChanges {
    pub version_nbr: i32,
    pub item_name: String,
    pub sku_code: String,
    pub item_desc: Option<String>,
    pub reorder_qty: i64,
    pub status_code: RecordStatus,
}

pub(crate) async fn active_item<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
) -> Result<item::Model, ServiceError> {
    let item = item::Entity::find_by_id(item_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;
    if !item.is_active() {
        return Err(ServiceError::ValidationError(format!(
            "Item {} is inactive",
            item.sku_code
        )));
    }
    Ok(item)
}

fn check_reorder_qty(reorder_qty: i64) -> Result<(), ServiceError> {
    if reorder_qty < 0 {
        return Err(ServiceError::ValidationError(
            "Reorder quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ItemService {
    db_pool: Arc<DbPool>,
}

impl ItemService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create_item(&self, input: NewItem, actor: &str) -> Result<item::Model, ServiceError> {
        let name = normalize_code("Item name", &input.item_name)?;
        let sku = normalize_code("SKU code", &input.sku_code)?;
        check_reorder_qty(input.reorder_qty)?;

        let txn = db::begin(&self.db_pool, "item.create").await?;
        ensure_unique::<item::Entity, _>(&txn, item::Column::SkuCode, &sku, None, "SKU code")
            .await?;

        let created = item::ActiveModel {
            item_name: Set(name),
            sku_code: Set(sku),
            item_desc: Set(input.item_desc),
            reorder_qty: Set(input.reorder_qty),
            status_code: Set(RecordStatus::Active),
            create_by_id: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(classify_db_error)?;
        db::commit(txn, "item.create").await?;

        info!(item_id = %created.id, sku = %created.sku_code, "Item created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: Uuid) -> Result<item::Model, ServiceError> {
        item::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        status: Option<RecordStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<item::Model>, u64), ServiceError> {
        let mut query = item::Entity::find();
        if let Some(status) = status {
            query = query.filter(item::Column::StatusCode.eq(status));
        }
        let paginator = query
            .order_by_asc(item::Column::ItemName)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((items, total))
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        id: Uuid,
        changes: ItemChanges,
        actor: &str,
    ) -> Result<item::Model, ServiceError> {
        let name = normalize_code("Item name", &changes.item_name)?;
        let sku = normalize_code("SKU code", &changes.sku_code)?;
        check_reorder_qty(changes.reorder_qty)?;

        let txn = db::begin(&self.db_pool, "item.update").await?;
        item::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))?;
        ensure_unique::<item::Entity, _>(&txn, item::Column::SkuCode, &sku, Some(id), "SKU code")
            .await?;

        let update = VersionedUpdate::<item::Entity>::new()
            .set(item::Column::ItemName, name)
            .set(item::Column::SkuCode, sku)
            .set(item::Column::ItemDesc, changes.item_desc)
            .set(item::Column::ReorderQty, changes.reorder_qty)
            .set(item::Column::StatusCode, changes.status_code);
        guarded_update(&txn, id, changes.version_nbr, actor, update).await?;

        let updated = item::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", id)))?;
        db::commit(txn, "item.update").await?;

        info!(item_id = %id, version = updated.version_nbr, "Item updated");
        Ok(updated)
    }
}
