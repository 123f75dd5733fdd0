//! Agency Service
//!
//! Agencies are validated against [`crate::rules::agency_warehouse_rule`]
//! before every write. The CHECK constraint on `agencies` enforces the same
//! rule at storage, so anything slipping past this service still fails with
//! `ConstraintViolation`.

use crate::db::{self, DbPool};
use crate::entities::{
    agency::{self, AgencyType},
    RecordStatus,
};
use crate::errors::{classify_db_error, ServiceError};
use crate::rules::agency_warehouse_rule;
use crate::services::concurrency::{guarded_update, VersionedUpdate};
use crate::services::unique_validation::{ensure_unique, normalize_code};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewAgency {
    pub agency_name: String,
    pub agency_type: AgencyType,
    pub warehouse_id: Option<Uuid>,
    pub contact_name: Option<String>,
    pub phone_no: Option<String>,
    pub email_text: Option<String>,
}

/// Full replacement of an agency. Changing `agency_type` must come with a
/// matching `warehouse_id`.
#[derive(Debug, Clone)]
pub struct AgencyChanges {
    pub version_nbr: i32,
    pub agency_name: String,
    pub agency_type: AgencyType,
    pub warehouse_id: Option<Uuid>,
    pub contact_name: Option<String>,
    pub phone_no: Option<String>,
    pub email_text: Option<String>,
    pub status_code: RecordStatus,
}

#[derive(Debug, Clone, Default)]
pub struct AgencyFilter {
    pub agency_type: Option<AgencyType>,
    pub warehouse_id: Option<Uuid>,
    pub status: Option<RecordStatus>,
}

/// Runs the agency/warehouse rule and, when a warehouse is referenced,
/// checks that it exists and is active.
async fn validate_warehouse_link<C: ConnectionTrait>(
    conn: &C,
    kind: AgencyType,
    warehouse_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    agency_warehouse_rule(kind, warehouse_id).map_err(|violation| {
        warn!(agency_type = %kind, ?warehouse_id, "Agency/warehouse rule rejected input");
        ServiceError::ValidationError(violation.to_string())
    })?;
    if let Some(warehouse_id) = warehouse_id {
        super::warehouses::active_warehouse(conn, warehouse_id).await?;
    }
    Ok(())
}

/// Loads an agency that may raise requests or receive packages.
pub(crate) async fn active_agency<C: ConnectionTrait>(
    conn: &C,
    agency_id: Uuid,
) -> Result<agency::Model, ServiceError> {
    let agency = agency::Entity::find_by_id(agency_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Agency {} not found", agency_id)))?;
    if !agency.is_active() {
        return Err(ServiceError::ValidationError(format!(
            "Agency {} is inactive",
            agency.agency_name
        )));
    }
    Ok(agency)
}

#[derive(Clone)]
pub struct AgencyService {
    db_pool: Arc<DbPool>,
}

impl AgencyService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn create_agency(
        &self,
        input: NewAgency,
        actor: &str,
    ) -> Result<agency::Model, ServiceError> {
        let name = normalize_code("Agency name", &input.agency_name)?;
        let txn = db::begin(&self.db_pool, "agency.create").await?;
        validate_warehouse_link(&txn, input.agency_type, input.warehouse_id).await?;
        ensure_unique::<agency::Entity, _>(
            &txn,
            agency::Column::AgencyName,
            &name,
            None,
            "Agency name",
        )
        .await?;

        let created = agency::ActiveModel {
            agency_name: Set(name),
            agency_type: Set(input.agency_type),
            warehouse_id: Set(input.warehouse_id),
            contact_name: Set(input.contact_name),
            phone_no: Set(input.phone_no),
            email_text: Set(input.email_text),
            status_code: Set(RecordStatus::Active),
            create_by_id: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(classify_db_error)?;
        db::commit(txn, "agency.create").await?;

        info!(
            agency_id = %created.id,
            agency_type = %created.agency_type,
            "Agency created"
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_agency(&self, id: Uuid) -> Result<agency::Model, ServiceError> {
        agency::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Agency {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_agencies(
        &self,
        filter: AgencyFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<agency::Model>, u64), ServiceError> {
        let mut query = agency::Entity::find();
        if let Some(kind) = filter.agency_type {
            query = query.filter(agency::Column::AgencyType.eq(kind));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(agency::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(agency::Column::StatusCode.eq(status));
        }
        let paginator = query
            .order_by_asc(agency::Column::AgencyName)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let agencies = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((agencies, total))
    }

    #[instrument(skip(self))]
    pub async fn update_agency(
        &self,
        id: Uuid,
        changes: AgencyChanges,
        actor: &str,
    ) -> Result<agency::Model, ServiceError> {
        let name = normalize_code("Agency name", &changes.agency_name)?;
        let txn = db::begin(&self.db_pool, "agency.update").await?;
        agency::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Agency {} not found", id)))?;
        validate_warehouse_link(&txn, changes.agency_type, changes.warehouse_id).await?;
        ensure_unique::<agency::Entity, _>(
            &txn,
            agency::Column::AgencyName,
            &name,
            Some(id),
            "Agency name",
        )
        .await?;

        let update = VersionedUpdate::<agency::Entity>::new()
            .set(agency::Column::AgencyName, name)
            .set(agency::Column::AgencyType, changes.agency_type)
            .set(agency::Column::WarehouseId, changes.warehouse_id)
            .set(agency::Column::ContactName, changes.contact_name)
            .set(agency::Column::PhoneNo, changes.phone_no)
            .set(agency::Column::EmailText, changes.email_text)
            .set(agency::Column::StatusCode, changes.status_code);
        guarded_update(&txn, id, changes.version_nbr, actor, update).await?;

        let updated = agency::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Agency {} not found", id)))?;
        db::commit(txn, "agency.update").await?;

        info!(agency_id = %id, version = updated.version_nbr, "Agency updated");
        Ok(updated)
    }
}
