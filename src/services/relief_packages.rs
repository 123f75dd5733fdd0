//! Relief Package Service
//!
//! A package moves DRAFT -> VERIFIED -> DISPATCHED, or to CANCELLED from
//! either of the first two states. Lines can only change while the package
//! is a draft, and each line holds a reservation on the source warehouse's
//! stock until the package is dispatched (consumed) or cancelled (released).
//!
//! Every mutating call runs in exactly one transaction and bumps the
//! package's version, so two users editing the same package conflict instead
//! of silently overwriting each other.

use crate::db::{self, DbPool};
use crate::entities::{
    inventory_reservation,
    relief_package::{self, PackageStatus},
    relief_package_item,
};
use crate::errors::{classify_db_error, ServiceError};
use crate::events::{Event, EventSender};
use crate::services::concurrency::{ensure_version, guarded_update, VersionedUpdate};
use crate::services::inventory_reservation_service::{self as reservations, InventoryLineKey};
use crate::tracing::OperationTimer;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePackage {
    pub agency_id: Uuid,
    pub warehouse_id: Uuid,
    pub comments_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageFilter {
    pub status: Option<PackageStatus>,
    pub agency_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
}

/// A package line together with the stock it currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PackageLine {
    #[serde(flatten)]
    pub line: relief_package_item::Model,
    pub reservation: Option<inventory_reservation::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PackageDetail {
    #[serde(flatten)]
    pub package: relief_package::Model,
    pub lines: Vec<PackageLine>,
}

/// Service for assembling, verifying and dispatching relief packages.
#[derive(Clone)]
pub struct ReliefPackageService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ReliefPackageService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an empty DRAFT package for `agency_id`, sourced from `warehouse_id`.
    #[instrument(skip(self))]
    pub async fn create_package(
        &self,
        input: CreatePackage,
        actor: &str,
    ) -> Result<relief_package::Model, ServiceError> {
        let txn = db::begin(&self.db_pool, "package.create").await?;

        let agency = super::agencies::active_agency(&txn, input.agency_id).await?;
        super::warehouses::active_warehouse(&txn, input.warehouse_id).await?;

        let package = relief_package::ActiveModel {
            agency_id: Set(agency.id),
            warehouse_id: Set(input.warehouse_id),
            status_code: Set(PackageStatus::Draft),
            comments_text: Set(input.comments_text),
            create_by_id: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(classify_db_error)?;

        db::commit(txn, "package.create").await?;

        info!(package_id = %package.id, agency_id = %package.agency_id, "Relief package created");
        self.event_sender
            .publish_all(vec![Event::PackageCreated(package.id)])
            .await;
        Ok(package)
    }

    /// Adds a line or changes its quantity, reserving stock for it.
    #[instrument(skip(self))]
    pub async fn set_line(
        &self,
        package_id: Uuid,
        expected_version: i32,
        item_id: Uuid,
        quantity: i64,
        actor: &str,
    ) -> Result<PackageDetail, ServiceError> {
        let _timer = OperationTimer::start("drims.packages.set_line.duration");
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(format!(
                "Quantity must be greater than zero, got {}",
                quantity
            )));
        }

        let txn = db::begin(&self.db_pool, "package.set_line").await?;
        let package = load_editable(&txn, package_id, expected_version).await?;
        super::items::active_item(&txn, item_id).await?;

        let existing = find_line(&txn, package_id, item_id).await?;
        let key = InventoryLineKey {
            warehouse_id: package.warehouse_id,
            item_id,
        };

        let event = match existing {
            None => {
                let line = relief_package_item::ActiveModel {
                    package_id: Set(package_id),
                    item_id: Set(item_id),
                    item_qty: Set(quantity),
                    create_by_id: Set(actor.to_string()),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(classify_db_error)?;

                let reservation = reservations::reserve(&txn, &line, key, quantity, actor).await?;
                Event::ReservationCreated {
                    reservation_id: reservation.id,
                    inventory_id: reservation.inventory_id,
                    package_id,
                    quantity,
                }
            }
            Some(line) => {
                let update = VersionedUpdate::<relief_package_item::Entity>::new()
                    .set(relief_package_item::Column::ItemQty, quantity);
                guarded_update(&txn, line.id, line.version_nbr, actor, update).await?;

                match reservations::reservation_for_line(&txn, line.id).await? {
                    Some(held) => {
                        let resized = reservations::resize(&txn, &held, quantity, actor).await?;
                        Event::ReservationResized {
                            reservation_id: resized.id,
                            inventory_id: resized.inventory_id,
                            old_quantity: held.reserved_qty,
                            new_quantity: quantity,
                        }
                    }
                    None => {
                        let reservation =
                            reservations::reserve(&txn, &line, key, quantity, actor).await?;
                        Event::ReservationCreated {
                            reservation_id: reservation.id,
                            inventory_id: reservation.inventory_id,
                            package_id,
                            quantity,
                        }
                    }
                }
            }
        };

        touch_package(&txn, &package, actor).await?;
        db::commit(txn, "package.set_line").await?;

        self.event_sender.publish_all(vec![event]).await;
        self.get_package(package_id).await
    }

    /// Removes a line and releases its reservation.
    #[instrument(skip(self))]
    pub async fn remove_line(
        &self,
        package_id: Uuid,
        expected_version: i32,
        item_id: Uuid,
        actor: &str,
    ) -> Result<PackageDetail, ServiceError> {
        let txn = db::begin(&self.db_pool, "package.remove_line").await?;
        let package = load_editable(&txn, package_id, expected_version).await?;

        let line = find_line(&txn, package_id, item_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Item {} is not part of package {}",
                item_id, package_id
            ))
        })?;

        let mut events = Vec::new();
        if let Some(held) = reservations::reservation_for_line(&txn, line.id).await? {
            reservations::release(&txn, &held, actor).await?;
            events.push(Event::ReservationReleased {
                reservation_id: held.id,
                inventory_id: held.inventory_id,
                quantity: held.reserved_qty,
            });
        }

        relief_package_item::Entity::delete_by_id(line.id)
            .exec(&txn)
            .await
            .map_err(classify_db_error)?;

        touch_package(&txn, &package, actor).await?;
        db::commit(txn, "package.remove_line").await?;

        self.event_sender.publish_all(events).await;
        self.get_package(package_id).await
    }

    /// DRAFT -> VERIFIED. The package must have at least one line.
    #[instrument(skip(self))]
    pub async fn verify(
        &self,
        package_id: Uuid,
        expected_version: i32,
        actor: &str,
    ) -> Result<relief_package::Model, ServiceError> {
        let txn = db::begin(&self.db_pool, "package.verify").await?;
        let package = load_for_transition(&txn, package_id, expected_version, PackageStatus::Verified)
            .await?;
        require_lines(&txn, &package).await?;

        let now = Utc::now();
        let update = VersionedUpdate::<relief_package::Entity>::new()
            .set(relief_package::Column::StatusCode, PackageStatus::Verified)
            .set(relief_package::Column::VerifyById, actor.to_string())
            .set(relief_package::Column::VerifyDtime, now);
        let version_nbr =
            guarded_update(&txn, package.id, package.version_nbr, actor, update).await?;
        db::commit(txn, "package.verify").await?;

        info!(package_id = %package_id, "Relief package verified");
        self.event_sender
            .publish_all(vec![Event::PackageVerified(package_id)])
            .await;

        Ok(relief_package::Model {
            status_code: PackageStatus::Verified,
            verify_by_id: Some(actor.to_string()),
            verify_dtime: Some(now),
            update_by_id: actor.to_string(),
            update_dtime: now,
            version_nbr,
            ..package
        })
    }

    /// DRAFT|VERIFIED -> DISPATCHED, consuming every reservation exactly once.
    #[instrument(skip(self))]
    pub async fn dispatch(
        &self,
        package_id: Uuid,
        expected_version: i32,
        actor: &str,
    ) -> Result<relief_package::Model, ServiceError> {
        let _timer = OperationTimer::start("drims.packages.dispatch.duration");
        let txn = db::begin(&self.db_pool, "package.dispatch").await?;
        let package =
            load_for_transition(&txn, package_id, expected_version, PackageStatus::Dispatched)
                .await?;
        let line_count = require_lines(&txn, &package).await?;

        // Claim the package first; a concurrent dispatch or cancel fails here.
        let now = Utc::now();
        let update = VersionedUpdate::<relief_package::Entity>::new()
            .set(relief_package::Column::StatusCode, PackageStatus::Dispatched)
            .set(relief_package::Column::DispatchById, actor.to_string())
            .set(relief_package::Column::DispatchDtime, now);
        let version_nbr =
            guarded_update(&txn, package.id, package.version_nbr, actor, update).await?;

        let held = reservations::reservations_for_package(&txn, package_id).await?;
        let mut events = Vec::with_capacity(held.len() + 1);
        let mut reorder_levels: HashMap<Uuid, i64> = HashMap::new();
        for reservation in &held {
            let line = reservations::consume(&txn, reservation, actor).await?;
            events.push(Event::ReservationConsumed {
                reservation_id: reservation.id,
                inventory_id: reservation.inventory_id,
                quantity: reservation.reserved_qty,
            });
            if let Some(event) = super::inventory::reorder_check(&txn, &line, &mut reorder_levels).await? {
                events.push(event);
            }
        }
        db::commit(txn, "package.dispatch").await?;

        info!(
            package_id = %package_id,
            lines = line_count,
            reservations = held.len(),
            "Relief package dispatched"
        );
        events.push(Event::PackageDispatched {
            package_id,
            dispatched_at: now,
            lines: line_count,
        });
        self.event_sender.publish_all(events).await;

        Ok(relief_package::Model {
            status_code: PackageStatus::Dispatched,
            dispatch_by_id: Some(actor.to_string()),
            dispatch_dtime: Some(now),
            update_by_id: actor.to_string(),
            update_dtime: now,
            version_nbr,
            ..package
        })
    }

    /// DRAFT|VERIFIED -> CANCELLED, releasing every reservation.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        package_id: Uuid,
        expected_version: i32,
        actor: &str,
    ) -> Result<relief_package::Model, ServiceError> {
        let txn = db::begin(&self.db_pool, "package.cancel").await?;
        let package =
            load_for_transition(&txn, package_id, expected_version, PackageStatus::Cancelled)
                .await?;

        let now = Utc::now();
        let update = VersionedUpdate::<relief_package::Entity>::new()
            .set(relief_package::Column::StatusCode, PackageStatus::Cancelled);
        let version_nbr =
            guarded_update(&txn, package.id, package.version_nbr, actor, update).await?;

        let held = reservations::reservations_for_package(&txn, package_id).await?;
        let mut events = Vec::with_capacity(held.len() + 1);
        for reservation in &held {
            reservations::release(&txn, reservation, actor).await?;
            events.push(Event::ReservationReleased {
                reservation_id: reservation.id,
                inventory_id: reservation.inventory_id,
                quantity: reservation.reserved_qty,
            });
        }
        db::commit(txn, "package.cancel").await?;

        info!(package_id = %package_id, released = held.len(), "Relief package cancelled");
        events.push(Event::PackageCancelled {
            package_id,
            released_lines: held.len(),
        });
        self.event_sender.publish_all(events).await;

        Ok(relief_package::Model {
            status_code: PackageStatus::Cancelled,
            update_by_id: actor.to_string(),
            update_dtime: now,
            version_nbr,
            ..package
        })
    }

    /// Gets a package with its lines and their reservations.
    #[instrument(skip(self))]
    pub async fn get_package(&self, package_id: Uuid) -> Result<PackageDetail, ServiceError> {
        let db = &*self.db_pool;
        let package = relief_package::Entity::find_by_id(package_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Relief package {} not found", package_id)))?;

        let lines = relief_package_item::Entity::find()
            .filter(relief_package_item::Column::PackageId.eq(package_id))
            .order_by_asc(relief_package_item::Column::CreateDtime)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut held: HashMap<Uuid, inventory_reservation::Model> =
            reservations::reservations_for_package(db, package_id)
                .await?
                .into_iter()
                .map(|r| (r.package_item_id, r))
                .collect();

        let lines = lines
            .into_iter()
            .map(|line| PackageLine {
                reservation: held.remove(&line.id),
                line,
            })
            .collect();

        Ok(PackageDetail { package, lines })
    }

    /// Lists packages, newest first.
    #[instrument(skip(self))]
    pub async fn list_packages(
        &self,
        filter: PackageFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<relief_package::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut query = relief_package::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(relief_package::Column::StatusCode.eq(status));
        }
        if let Some(agency_id) = filter.agency_id {
            query = query.filter(relief_package::Column::AgencyId.eq(agency_id));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(relief_package::Column::WarehouseId.eq(warehouse_id));
        }

        let paginator = query
            .order_by_desc(relief_package::Column::CreateDtime)
            .paginate(db, per_page);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let packages = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((packages, total))
    }
}

async fn load_package<C: ConnectionTrait>(
    conn: &C,
    package_id: Uuid,
    expected_version: i32,
) -> Result<relief_package::Model, ServiceError> {
    let package = relief_package::Entity::find_by_id(package_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Relief package {} not found", package_id)))?;
    ensure_version::<relief_package::Entity>(package.id, package.version_nbr, expected_version)?;
    Ok(package)
}

async fn load_editable<C: ConnectionTrait>(
    conn: &C,
    package_id: Uuid,
    expected_version: i32,
) -> Result<relief_package::Model, ServiceError> {
    let package = load_package(conn, package_id, expected_version).await?;
    if !package.status_code.is_editable() {
        return Err(ServiceError::InvalidStatus(format!(
            "Package {} is {}; items can only change while it is {}",
            package.id,
            package.status_code,
            PackageStatus::Draft
        )));
    }
    Ok(package)
}

async fn load_for_transition<C: ConnectionTrait>(
    conn: &C,
    package_id: Uuid,
    expected_version: i32,
    next: PackageStatus,
) -> Result<relief_package::Model, ServiceError> {
    let package = load_package(conn, package_id, expected_version).await?;
    if !package.status_code.can_transition_to(next) {
        warn!(
            package_id = %package.id,
            from = %package.status_code,
            to = %next,
            "Rejected package transition"
        );
        return Err(ServiceError::InvalidStatus(format!(
            "Package {} cannot move from {} to {}",
            package.id, package.status_code, next
        )));
    }
    Ok(package)
}

async fn find_line<C: ConnectionTrait>(
    conn: &C,
    package_id: Uuid,
    item_id: Uuid,
) -> Result<Option<relief_package_item::Model>, ServiceError> {
    relief_package_item::Entity::find()
        .filter(relief_package_item::Column::PackageId.eq(package_id))
        .filter(relief_package_item::Column::ItemId.eq(item_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)
}

async fn require_lines<C: ConnectionTrait>(
    conn: &C,
    package: &relief_package::Model,
) -> Result<usize, ServiceError> {
    let count = relief_package_item::Entity::find()
        .filter(relief_package_item::Column::PackageId.eq(package.id))
        .count(conn)
        .await
        .map_err(ServiceError::db_error)?;
    if count == 0 {
        return Err(ServiceError::ValidationError(format!(
            "Package {} has no items",
            package.id
        )));
    }
    Ok(count as usize)
}

/// Bumps the package version after a line change.
async fn touch_package<C: ConnectionTrait>(
    conn: &C,
    package: &relief_package::Model,
    actor: &str,
) -> Result<i32, ServiceError> {
    guarded_update(
        conn,
        package.id,
        package.version_nbr,
        actor,
        VersionedUpdate::<relief_package::Entity>::new(),
    )
    .await
}
