//! Inventory Service
//!
//! Stock enters a warehouse through receipts and leaves it through package
//! dispatch or write-offs. Every change to a line goes through the version
//! guard, the same as reservations do.

use crate::db::{self, DbPool};
use crate::entities::{
    inventory_balance::{self, InventoryStatus},
    item,
};
use crate::errors::{classify_db_error, ServiceError};
use crate::events::{Event, EventSender};
use crate::services::concurrency::{ensure_version, guarded_update, VersionedUpdate};
use crate::services::inventory_reservation_service::{find_line, stock_error, InventoryLineKey};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct StockReceipt {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct WriteOff {
    pub version_nbr: i32,
    pub defective_qty: i64,
    pub expired_qty: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryFilter {
    pub warehouse_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub status: Option<InventoryStatus>,
}

/// Reports a line whose usable stock dropped to the item's reorder quantity.
///
/// `reorder_levels` caches item lookups across the lines of one operation.
pub(crate) async fn reorder_check<C: ConnectionTrait>(
    conn: &C,
    line: &inventory_balance::Model,
    reorder_levels: &mut HashMap<Uuid, i64>,
) -> Result<Option<Event>, ServiceError> {
    let reorder_qty = match reorder_levels.get(&line.item_id) {
        Some(qty) => *qty,
        None => {
            let qty = item::Entity::find_by_id(line.item_id)
                .one(conn)
                .await
                .map_err(ServiceError::db_error)?
                .map(|i| i.reorder_qty)
                .unwrap_or(0);
            reorder_levels.insert(line.item_id, qty);
            qty
        }
    };

    if reorder_qty > 0 && line.usable_qty <= reorder_qty {
        return Ok(Some(Event::ReorderThresholdReached {
            inventory_id: line.id,
            item_id: line.item_id,
            usable: line.usable_qty,
            reorder_qty,
        }));
    }
    Ok(None)
}

#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Adds `quantity` usable units, creating the line on first receipt.
    #[instrument(skip(self))]
    pub async fn receive_stock(
        &self,
        receipt: StockReceipt,
        actor: &str,
    ) -> Result<inventory_balance::Model, ServiceError> {
        if receipt.quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity must be greater than zero, got {}",
                receipt.quantity
            )));
        }

        let txn = db::begin(&self.db_pool, "inventory.receive").await?;
        super::warehouses::active_warehouse(&txn, receipt.warehouse_id).await?;
        super::items::active_item(&txn, receipt.item_id).await?;

        let key = InventoryLineKey {
            warehouse_id: receipt.warehouse_id,
            item_id: receipt.item_id,
        };
        let line = match find_line(&txn, key).await? {
            Some(line) => {
                let levels = line
                    .levels()
                    .receive(receipt.quantity)
                    .map_err(|e| stock_error(&line, e))?;
                let update = VersionedUpdate::<inventory_balance::Entity>::new()
                    .set(inventory_balance::Column::UsableQty, levels.usable);
                let version_nbr =
                    guarded_update(&txn, line.id, line.version_nbr, actor, update).await?;
                inventory_balance::Model {
                    usable_qty: levels.usable,
                    version_nbr,
                    update_by_id: actor.to_string(),
                    update_dtime: Utc::now(),
                    ..line
                }
            }
            None => inventory_balance::ActiveModel {
                warehouse_id: Set(receipt.warehouse_id),
                item_id: Set(receipt.item_id),
                usable_qty: Set(receipt.quantity),
                reserved_qty: Set(0),
                defective_qty: Set(0),
                expired_qty: Set(0),
                status_code: Set(InventoryStatus::Available),
                create_by_id: Set(actor.to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(classify_db_error)?,
        };
        db::commit(txn, "inventory.receive").await?;

        info!(
            inventory_id = %line.id,
            quantity = receipt.quantity,
            usable = line.usable_qty,
            "Stock received"
        );
        self.event_sender
            .publish_all(vec![Event::StockReceived {
                inventory_id: line.id,
                quantity: receipt.quantity,
            }])
            .await;
        Ok(line)
    }

    /// Moves unreserved usable stock into the defective and expired counts.
    #[instrument(skip(self))]
    pub async fn write_off(
        &self,
        inventory_id: Uuid,
        write_off: WriteOff,
        actor: &str,
    ) -> Result<inventory_balance::Model, ServiceError> {
        let txn = db::begin(&self.db_pool, "inventory.write_off").await?;
        let line = inventory_balance::Entity::find_by_id(inventory_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory line {} not found", inventory_id))
            })?;
        ensure_version::<inventory_balance::Entity>(line.id, line.version_nbr, write_off.version_nbr)?;

        let levels = line
            .levels()
            .write_off(write_off.defective_qty, write_off.expired_qty)
            .map_err(|e| stock_error(&line, e))?;
        let update = VersionedUpdate::<inventory_balance::Entity>::new()
            .set(inventory_balance::Column::UsableQty, levels.usable)
            .set(inventory_balance::Column::DefectiveQty, levels.defective)
            .set(inventory_balance::Column::ExpiredQty, levels.expired);
        let version_nbr =
            guarded_update(&txn, line.id, write_off.version_nbr, actor, update).await?;

        let updated = inventory_balance::Model {
            usable_qty: levels.usable,
            defective_qty: levels.defective,
            expired_qty: levels.expired,
            version_nbr,
            update_by_id: actor.to_string(),
            update_dtime: Utc::now(),
            ..line
        };
        let reorder = reorder_check(&txn, &updated, &mut HashMap::new()).await?;
        db::commit(txn, "inventory.write_off").await?;

        info!(
            inventory_id = %inventory_id,
            defective = write_off.defective_qty,
            expired = write_off.expired_qty,
            "Stock written off"
        );
        let mut events = vec![Event::StockWrittenOff {
            inventory_id,
            defective: write_off.defective_qty,
            expired: write_off.expired_qty,
        }];
        events.extend(reorder);
        self.event_sender.publish_all(events).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_line(&self, inventory_id: Uuid) -> Result<inventory_balance::Model, ServiceError> {
        inventory_balance::Entity::find_by_id(inventory_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory line {} not found", inventory_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_inventory(
        &self,
        filter: InventoryFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<inventory_balance::Model>, u64), ServiceError> {
        let mut query = inventory_balance::Entity::find();
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(inventory_balance::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(item_id) = filter.item_id {
            query = query.filter(inventory_balance::Column::ItemId.eq(item_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(inventory_balance::Column::StatusCode.eq(status));
        }
        let paginator = query
            .order_by_asc(inventory_balance::Column::WarehouseId)
            .order_by_asc(inventory_balance::Column::ItemId)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let lines = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((lines, total))
    }
}
