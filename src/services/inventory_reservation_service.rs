//! Inventory Reservation Service
//!
//! Holds, releases and consumes stock on behalf of relief package lines.
//! The write operations are free functions over a caller-supplied connection
//! so they always commit or roll back together with the package change that
//! triggered them.

use crate::entities::{
    inventory_balance::{self, InventoryStatus, StockError, StockLevels},
    inventory_reservation, relief_package, relief_package_item,
};
use crate::errors::{classify_db_error, ServiceError};
use crate::services::concurrency::{guarded_update, VersionedUpdate};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use sea_orm::sea_query::JoinType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identifies an inventory line by its natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLineKey {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
}

/// Reservable stock of one item in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Availability {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    /// Absent when the warehouse has never held the item
    pub inventory_id: Option<Uuid>,
    pub usable_qty: i64,
    pub reserved_qty: i64,
    pub available_qty: i64,
}

/// Translates a refused stock movement on `line` into a service error.
pub(crate) fn stock_error(line: &inventory_balance::Model, err: StockError) -> ServiceError {
    match err {
        StockError::NonPositive(quantity) => ServiceError::ValidationError(format!(
            "Quantity must be greater than zero, got {}",
            quantity
        )),
        StockError::Insufficient {
            requested,
            available,
        } => ServiceError::InsufficientStock {
            warehouse_id: line.warehouse_id,
            item_id: line.item_id,
            requested,
            available,
        },
        StockError::Overflow { .. } => ServiceError::ValidationError(format!(
            "Quantity for inventory line {} is too large: {}",
            line.id, err
        )),
        StockError::ExceedsHeld { .. } => ServiceError::InternalError(format!(
            "Inventory line {} is inconsistent with its reservations: {}",
            line.id, err
        )),
    }
}

pub(crate) async fn find_line<C: ConnectionTrait>(
    conn: &C,
    key: InventoryLineKey,
) -> Result<Option<inventory_balance::Model>, ServiceError> {
    inventory_balance::Entity::find()
        .filter(inventory_balance::Column::WarehouseId.eq(key.warehouse_id))
        .filter(inventory_balance::Column::ItemId.eq(key.item_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)
}

async fn line_by_id<C: ConnectionTrait>(
    conn: &C,
    inventory_id: Uuid,
) -> Result<inventory_balance::Model, ServiceError> {
    inventory_balance::Entity::find_by_id(inventory_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Inventory line {} not found", inventory_id)))
}

/// Writes new quantity levels through the version guard.
async fn store_levels<C: ConnectionTrait>(
    conn: &C,
    line: &inventory_balance::Model,
    levels: StockLevels,
    actor: &str,
) -> Result<i32, ServiceError> {
    let update = VersionedUpdate::<inventory_balance::Entity>::new()
        .set(inventory_balance::Column::UsableQty, levels.usable)
        .set(inventory_balance::Column::ReservedQty, levels.reserved)
        .set(inventory_balance::Column::DefectiveQty, levels.defective)
        .set(inventory_balance::Column::ExpiredQty, levels.expired);
    guarded_update(conn, line.id, line.version_nbr, actor, update).await
}

/// Holds `quantity` units of the line's stock for `package_item`.
///
/// Fails with `InsufficientStock` when `quantity` exceeds
/// `usable_qty - reserved_qty`; nothing is written in that case.
#[instrument(skip(conn, package_item), fields(package_item_id = %package_item.id))]
pub async fn reserve<C: ConnectionTrait>(
    conn: &C,
    package_item: &relief_package_item::Model,
    key: InventoryLineKey,
    quantity: i64,
    actor: &str,
) -> Result<inventory_reservation::Model, ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::ValidationError(format!(
            "Quantity must be greater than zero, got {}",
            quantity
        )));
    }

    let Some(line) = find_line(conn, key).await? else {
        counter!("drims.reservations.refused", 1);
        return Err(ServiceError::InsufficientStock {
            warehouse_id: key.warehouse_id,
            item_id: key.item_id,
            requested: quantity,
            available: 0,
        });
    };

    if line.status_code == InventoryStatus::Unavailable {
        counter!("drims.reservations.refused", 1);
        return Err(ServiceError::InsufficientStock {
            warehouse_id: key.warehouse_id,
            item_id: key.item_id,
            requested: quantity,
            available: 0,
        });
    }

    let levels = line.levels().reserve(quantity).map_err(|e| {
        counter!("drims.reservations.refused", 1);
        stock_error(&line, e)
    })?;
    store_levels(conn, &line, levels, actor).await?;

    let reservation = inventory_reservation::ActiveModel {
        package_item_id: Set(package_item.id),
        inventory_id: Set(line.id),
        reserved_qty: Set(quantity),
        create_by_id: Set(actor.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(classify_db_error)?;

    counter!("drims.reservations.created", 1);
    info!(
        reservation_id = %reservation.id,
        inventory_id = %line.id,
        quantity,
        available_after = levels.available(),
        "Reserved stock"
    );
    Ok(reservation)
}

/// Returns the reserved quantity to availability and deletes the hold.
#[instrument(skip(conn, reservation), fields(reservation_id = %reservation.id))]
pub async fn release<C: ConnectionTrait>(
    conn: &C,
    reservation: &inventory_reservation::Model,
    actor: &str,
) -> Result<(), ServiceError> {
    let line = line_by_id(conn, reservation.inventory_id).await?;
    let levels = line
        .levels()
        .release(reservation.reserved_qty)
        .map_err(|e| stock_error(&line, e))?;
    store_levels(conn, &line, levels, actor).await?;
    delete_reservation(conn, reservation).await?;

    counter!("drims.reservations.released", 1);
    info!(
        inventory_id = %line.id,
        quantity = reservation.reserved_qty,
        "Released reservation"
    );
    Ok(())
}

/// Permanently removes the reserved quantity from the line and deletes the
/// hold.
#[instrument(skip(conn, reservation), fields(reservation_id = %reservation.id))]
pub async fn consume<C: ConnectionTrait>(
    conn: &C,
    reservation: &inventory_reservation::Model,
    actor: &str,
) -> Result<inventory_balance::Model, ServiceError> {
    let line = line_by_id(conn, reservation.inventory_id).await?;
    let levels = line
        .levels()
        .consume(reservation.reserved_qty)
        .map_err(|e| stock_error(&line, e))?;
    let version_nbr = store_levels(conn, &line, levels, actor).await?;
    delete_reservation(conn, reservation).await?;

    counter!("drims.reservations.consumed", 1);
    info!(
        inventory_id = %line.id,
        quantity = reservation.reserved_qty,
        usable_after = levels.usable,
        "Consumed reservation"
    );
    Ok(inventory_balance::Model {
        usable_qty: levels.usable,
        reserved_qty: levels.reserved,
        version_nbr,
        update_by_id: actor.to_string(),
        update_dtime: Utc::now(),
        ..line
    })
}

/// Grows or shrinks a hold in place. Growing is subject to availability.
#[instrument(skip(conn, reservation), fields(reservation_id = %reservation.id))]
pub async fn resize<C: ConnectionTrait>(
    conn: &C,
    reservation: &inventory_reservation::Model,
    new_quantity: i64,
    actor: &str,
) -> Result<inventory_reservation::Model, ServiceError> {
    if new_quantity <= 0 {
        return Err(ServiceError::ValidationError(format!(
            "Quantity must be greater than zero, got {}",
            new_quantity
        )));
    }
    let delta = new_quantity - reservation.reserved_qty;
    if delta == 0 {
        return Ok(reservation.clone());
    }

    let line = line_by_id(conn, reservation.inventory_id).await?;
    let levels = if delta > 0 {
        line.levels().reserve(delta)
    } else {
        line.levels().release(-delta)
    }
    .map_err(|e| stock_error(&line, e))?;
    store_levels(conn, &line, levels, actor).await?;

    let result = inventory_reservation::Entity::update_many()
        .col_expr(
            inventory_reservation::Column::ReservedQty,
            sea_orm::sea_query::Expr::value(new_quantity),
        )
        .filter(inventory_reservation::Column::Id.eq(reservation.id))
        .exec(conn)
        .await
        .map_err(classify_db_error)?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Reservation {} not found",
            reservation.id
        )));
    }

    debug!(
        old_quantity = reservation.reserved_qty,
        new_quantity, "Resized reservation"
    );
    Ok(inventory_reservation::Model {
        reserved_qty: new_quantity,
        ..reservation.clone()
    })
}

async fn delete_reservation<C: ConnectionTrait>(
    conn: &C,
    reservation: &inventory_reservation::Model,
) -> Result<(), ServiceError> {
    let result = inventory_reservation::Entity::delete_by_id(reservation.id)
        .exec(conn)
        .await
        .map_err(classify_db_error)?;
    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Reservation {} not found",
            reservation.id
        )));
    }
    Ok(())
}

/// Reservations held by the lines of `package_id`.
pub async fn reservations_for_package<C: ConnectionTrait>(
    conn: &C,
    package_id: Uuid,
) -> Result<Vec<inventory_reservation::Model>, ServiceError> {
    inventory_reservation::Entity::find()
        .join(
            JoinType::InnerJoin,
            inventory_reservation::Relation::PackageItem.def(),
        )
        .filter(relief_package_item::Column::PackageId.eq(package_id))
        .order_by_asc(inventory_reservation::Column::CreateDtime)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Reservation held by one package line, if any.
pub async fn reservation_for_line<C: ConnectionTrait>(
    conn: &C,
    package_item_id: Uuid,
) -> Result<Option<inventory_reservation::Model>, ServiceError> {
    inventory_reservation::Entity::find()
        .filter(inventory_reservation::Column::PackageItemId.eq(package_item_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)
}

pub async fn availability<C: ConnectionTrait>(
    conn: &C,
    key: InventoryLineKey,
) -> Result<Availability, ServiceError> {
    let line = find_line(conn, key).await?;
    Ok(match line {
        Some(line) => {
            let reservable = line.status_code == InventoryStatus::Available;
            Availability {
                warehouse_id: key.warehouse_id,
                item_id: key.item_id,
                inventory_id: Some(line.id),
                usable_qty: line.usable_qty,
                reserved_qty: line.reserved_qty,
                available_qty: if reservable { line.available_qty() } else { 0 },
            }
        }
        None => Availability {
            warehouse_id: key.warehouse_id,
            item_id: key.item_id,
            inventory_id: None,
            usable_qty: 0,
            reserved_qty: 0,
            available_qty: 0,
        },
    })
}

/// Read-side access to reservations for the HTTP layer.
#[derive(Clone)]
pub struct InventoryReservationService {
    db_pool: Arc<DatabaseConnection>,
}

impl InventoryReservationService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn availability(
        &self,
        warehouse_id: Uuid,
        item_id: Uuid,
    ) -> Result<Availability, ServiceError> {
        availability(
            &*self.db_pool,
            InventoryLineKey {
                warehouse_id,
                item_id,
            },
        )
        .await
    }

    /// Stock currently held by a package, oldest hold first.
    #[instrument(skip(self))]
    pub async fn reservations_for_package(
        &self,
        package_id: Uuid,
    ) -> Result<Vec<inventory_reservation::Model>, ServiceError> {
        let db = &*self.db_pool;
        relief_package::Entity::find_by_id(package_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Relief package {} not found", package_id))
            })?;
        reservations_for_package(db, package_id).await
    }
}
