//! Disaster Event Service
//!
//! Events are opened ACTIVE and closed once; closing records the date and a
//! reason. Relief requests may only be raised against an active event.

use crate::db::{self, DbPool};
use crate::entities::disaster_event::{self, EventStatus, EventType};
use crate::errors::{classify_db_error, ServiceError};
use crate::events::{Event, EventSender};
use crate::services::concurrency::{ensure_version, guarded_update, VersionedUpdate};
use crate::services::unique_validation::{ensure_unique, normalize_code};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_CLOSE_REASON: &str = "Closed by user";

#[derive(Debug, Clone)]
pub struct NewDisasterEvent {
    pub event_name: String,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub event_desc: String,
    pub impact_desc: Option<String>,
}

/// Loads an event that new relief requests may reference.
pub(crate) async fn active_event<C: ConnectionTrait>(
    conn: &C,
    event_id: Uuid,
) -> Result<disaster_event::Model, ServiceError> {
    let event = disaster_event::Entity::find_by_id(event_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Disaster event {} not found", event_id)))?;
    if !event.is_active() {
        return Err(ServiceError::ValidationError(format!(
            "Disaster event {} is closed",
            event.event_name
        )));
    }
    Ok(event)
}

#[derive(Clone)]
pub struct DisasterEventService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl DisasterEventService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_event(
        &self,
        input: NewDisasterEvent,
        actor: &str,
    ) -> Result<disaster_event::Model, ServiceError> {
        let name = normalize_code("Event name", &input.event_name)?;
        if input.event_desc.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Event description must not be empty".to_string(),
            ));
        }

        let txn = db::begin(&self.db_pool, "disaster_event.create").await?;
        ensure_unique::<disaster_event::Entity, _>(
            &txn,
            disaster_event::Column::EventName,
            &name,
            None,
            "Event name",
        )
        .await?;

        let created = disaster_event::ActiveModel {
            event_name: Set(name),
            event_type: Set(input.event_type),
            start_date: Set(input.start_date),
            event_desc: Set(input.event_desc.trim().to_string()),
            impact_desc: Set(input.impact_desc),
            status_code: Set(EventStatus::Active),
            closed_date: Set(None),
            reason_desc: Set(None),
            create_by_id: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(classify_db_error)?;
        db::commit(txn, "disaster_event.create").await?;

        info!(event_id = %created.id, name = %created.event_name, "Disaster event opened");
        self.event_sender
            .publish_all(vec![Event::DisasterEventOpened(created.id)])
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_event(&self, id: Uuid) -> Result<disaster_event::Model, ServiceError> {
        disaster_event::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Disaster event {} not found", id)))
    }

    /// Lists events, most recent start date first.
    #[instrument(skip(self))]
    pub async fn list_events(
        &self,
        status: Option<EventStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<disaster_event::Model>, u64), ServiceError> {
        let mut query = disaster_event::Entity::find();
        if let Some(status) = status {
            query = query.filter(disaster_event::Column::StatusCode.eq(status));
        }
        let paginator = query
            .order_by_desc(disaster_event::Column::StartDate)
            .order_by_asc(disaster_event::Column::EventName)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let events = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((events, total))
    }

    /// ACTIVE -> CLOSED. `reason` falls back to [`DEFAULT_CLOSE_REASON`].
    #[instrument(skip(self))]
    pub async fn close_event(
        &self,
        id: Uuid,
        expected_version: i32,
        reason: Option<String>,
        actor: &str,
    ) -> Result<disaster_event::Model, ServiceError> {
        let txn = db::begin(&self.db_pool, "disaster_event.close").await?;
        let event = disaster_event::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Disaster event {} not found", id)))?;
        ensure_version::<disaster_event::Entity>(event.id, event.version_nbr, expected_version)?;
        if !event.is_active() {
            warn!(event_id = %id, "Rejected close of a closed disaster event");
            return Err(ServiceError::InvalidStatus(format!(
                "Disaster event {} is already closed",
                event.event_name
            )));
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_CLOSE_REASON.to_string());
        let now = Utc::now();
        let closed_date = now.date_naive();
        let update = VersionedUpdate::<disaster_event::Entity>::new()
            .set(disaster_event::Column::StatusCode, EventStatus::Closed)
            .set(disaster_event::Column::ClosedDate, closed_date)
            .set(disaster_event::Column::ReasonDesc, reason.clone());
        let version_nbr = guarded_update(&txn, event.id, event.version_nbr, actor, update).await?;
        db::commit(txn, "disaster_event.close").await?;

        info!(event_id = %id, "Disaster event closed");
        self.event_sender
            .publish_all(vec![Event::DisasterEventClosed(id)])
            .await;

        Ok(disaster_event::Model {
            status_code: EventStatus::Closed,
            closed_date: Some(closed_date),
            reason_desc: Some(reason),
            update_by_id: actor.to_string(),
            update_dtime: now,
            version_nbr,
            ..event
        })
    }
}
