//! Relief Request Service
//!
//! An agency drafts a request for relief items, submits it for approval and
//! a reviewer approves or denies it. Approved (SUBMITTED) requests are what
//! relief packages are assembled against; they close once filled.
//!
//! Lines only change while the request is a DRAFT. Every write bumps the
//! request's version through [`guarded_update`].

use crate::db::{self, DbPool};
use crate::entities::{
    relief_request::{self, RequestStage, RequestStatus, Urgency},
    relief_request_item::{self, LineStatus},
};
use crate::errors::{classify_db_error, ServiceError};
use crate::events::{Event, EventSender};
use crate::services::concurrency::{ensure_version, guarded_update, VersionedUpdate};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewRequestLine {
    pub item_id: Uuid,
    pub quantity: i64,
    /// Defaults to the request's own urgency
    pub urgency_ind: Option<Urgency>,
}

#[derive(Debug, Clone)]
pub struct NewReliefRequest {
    pub agency_id: Uuid,
    pub event_id: Option<Uuid>,
    pub request_date: NaiveDate,
    pub urgency_ind: Urgency,
    pub comments_text: Option<String>,
    pub lines: Vec<NewRequestLine>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub stage: RequestStage,
    pub status: Option<RequestStatus>,
    pub agency_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: relief_request::Model,
    pub lines: Vec<relief_request_item::Model>,
}

#[derive(Clone)]
pub struct ReliefRequestService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ReliefRequestService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a DRAFT request and its lines in one transaction.
    #[instrument(skip(self))]
    pub async fn create_request(
        &self,
        input: NewReliefRequest,
        actor: &str,
    ) -> Result<RequestDetail, ServiceError> {
        let mut seen = HashSet::with_capacity(input.lines.len());
        for line in &input.lines {
            check_quantity(line.quantity)?;
            if !seen.insert(line.item_id) {
                return Err(ServiceError::ValidationError(format!(
                    "Item {} is listed more than once",
                    line.item_id
                )));
            }
        }

        let txn = db::begin(&self.db_pool, "request.create").await?;
        let agency = super::agencies::active_agency(&txn, input.agency_id).await?;
        if let Some(event_id) = input.event_id {
            super::disaster_events::active_event(&txn, event_id).await?;
        }

        let request = relief_request::ActiveModel {
            agency_id: Set(agency.id),
            event_id: Set(input.event_id),
            request_date: Set(input.request_date),
            urgency_ind: Set(input.urgency_ind),
            status_code: Set(RequestStatus::Draft),
            review_by_id: Set(None),
            review_dtime: Set(None),
            status_reason_desc: Set(None),
            comments_text: Set(input.comments_text),
            create_by_id: Set(actor.to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(classify_db_error)?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            super::items::active_item(&txn, line.item_id).await?;
            let urgency = line.urgency_ind.unwrap_or(request.urgency_ind);
            let created =
                insert_line(&txn, request.id, line.item_id, line.quantity, urgency, actor).await?;
            lines.push(created);
        }
        db::commit(txn, "request.create").await?;

        info!(
            request_id = %request.id,
            agency_id = %request.agency_id,
            lines = lines.len(),
            "Relief request created"
        );
        self.event_sender
            .publish_all(vec![Event::RequestCreated {
                request_id: request.id,
                agency_id: request.agency_id,
                lines: lines.len(),
            }])
            .await;
        Ok(RequestDetail { request, lines })
    }

    /// Adds a line or changes its quantity and urgency.
    #[instrument(skip(self))]
    pub async fn set_line(
        &self,
        request_id: Uuid,
        expected_version: i32,
        item_id: Uuid,
        quantity: i64,
        urgency_ind: Option<Urgency>,
        actor: &str,
    ) -> Result<RequestDetail, ServiceError> {
        check_quantity(quantity)?;
        let txn = db::begin(&self.db_pool, "request.set_line").await?;
        let request = load_editable(&txn, request_id, expected_version).await?;
        super::items::active_item(&txn, item_id).await?;
        let urgency = urgency_ind.unwrap_or(request.urgency_ind);

        match find_line(&txn, request_id, item_id).await? {
            None => {
                insert_line(&txn, request_id, item_id, quantity, urgency, actor).await?;
            }
            Some(line) => {
                let update = VersionedUpdate::<relief_request_item::Entity>::new()
                    .set(relief_request_item::Column::RequestQty, quantity)
                    .set(relief_request_item::Column::UrgencyInd, urgency);
                guarded_update(&txn, line.id, line.version_nbr, actor, update).await?;
            }
        }

        touch_request(&txn, &request, actor).await?;
        db::commit(txn, "request.set_line").await?;
        self.get_request(request_id).await
    }

    #[instrument(skip(self))]
    pub async fn remove_line(
        &self,
        request_id: Uuid,
        expected_version: i32,
        item_id: Uuid,
        actor: &str,
    ) -> Result<RequestDetail, ServiceError> {
        let txn = db::begin(&self.db_pool, "request.remove_line").await?;
        let request = load_editable(&txn, request_id, expected_version).await?;
        let line = find_line(&txn, request_id, item_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Item {} is not part of request {}",
                item_id, request_id
            ))
        })?;
        relief_request_item::Entity::delete_by_id(line.id)
            .exec(&txn)
            .await
            .map_err(classify_db_error)?;

        touch_request(&txn, &request, actor).await?;
        db::commit(txn, "request.remove_line").await?;
        self.get_request(request_id).await
    }

    /// DRAFT -> AWAITING_APPROVAL. The request must have at least one line.
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        request_id: Uuid,
        expected_version: i32,
        actor: &str,
    ) -> Result<relief_request::Model, ServiceError> {
        self.transition(
            "request.submit",
            request_id,
            expected_version,
            RequestStatus::AwaitingApproval,
            None,
            actor,
        )
        .await
    }

    /// AWAITING_APPROVAL -> SUBMITTED, stamping the reviewer.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        request_id: Uuid,
        expected_version: i32,
        actor: &str,
    ) -> Result<relief_request::Model, ServiceError> {
        self.transition(
            "request.approve",
            request_id,
            expected_version,
            RequestStatus::Submitted,
            None,
            actor,
        )
        .await
    }

    /// AWAITING_APPROVAL -> DENIED. A reason is required.
    #[instrument(skip(self))]
    pub async fn deny(
        &self,
        request_id: Uuid,
        expected_version: i32,
        reason: String,
        actor: &str,
    ) -> Result<relief_request::Model, ServiceError> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(ServiceError::ValidationError(
                "A reason is required to deny a request".to_string(),
            ));
        }
        self.transition(
            "request.deny",
            request_id,
            expected_version,
            RequestStatus::Denied,
            Some(reason),
            actor,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        request_id: Uuid,
        expected_version: i32,
        reason: Option<String>,
        actor: &str,
    ) -> Result<relief_request::Model, ServiceError> {
        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        self.transition(
            "request.cancel",
            request_id,
            expected_version,
            RequestStatus::Cancelled,
            reason,
            actor,
        )
        .await
    }

    async fn transition(
        &self,
        op: &'static str,
        request_id: Uuid,
        expected_version: i32,
        next: RequestStatus,
        reason: Option<String>,
        actor: &str,
    ) -> Result<relief_request::Model, ServiceError> {
        let txn = db::begin(&self.db_pool, op).await?;
        let request = load_request(&txn, request_id, expected_version).await?;
        if !request.status_code.can_transition_to(next) {
            warn!(
                request_id = %request.id,
                from = %request.status_code,
                to = %next,
                "Rejected request transition"
            );
            return Err(ServiceError::InvalidStatus(format!(
                "Relief request {} cannot move from {} to {}",
                request.id, request.status_code, next
            )));
        }
        if next == RequestStatus::AwaitingApproval {
            require_lines(&txn, &request).await?;
        }

        let now = Utc::now();
        let reviewed = matches!(next, RequestStatus::Submitted | RequestStatus::Denied);
        let mut update = VersionedUpdate::<relief_request::Entity>::new()
            .set(relief_request::Column::StatusCode, next);
        if reviewed {
            update = update
                .set(relief_request::Column::ReviewById, actor.to_string())
                .set(relief_request::Column::ReviewDtime, now);
        }
        if let Some(reason) = &reason {
            update = update.set(relief_request::Column::StatusReasonDesc, reason.clone());
        }
        let version_nbr =
            guarded_update(&txn, request.id, request.version_nbr, actor, update).await?;
        db::commit(txn, op).await?;

        info!(
            request_id = %request_id,
            from = %request.status_code,
            to = %next,
            "Relief request status changed"
        );
        self.event_sender
            .publish_all(vec![Event::RequestStatusChanged {
                request_id,
                from: request.status_code,
                to: next,
            }])
            .await;

        Ok(relief_request::Model {
            status_code: next,
            review_by_id: if reviewed {
                Some(actor.to_string())
            } else {
                request.review_by_id.clone()
            },
            review_dtime: if reviewed { Some(now) } else { request.review_dtime },
            status_reason_desc: reason.or(request.status_reason_desc.clone()),
            update_by_id: actor.to_string(),
            update_dtime: now,
            version_nbr,
            ..request
        })
    }

    #[instrument(skip(self))]
    pub async fn get_request(&self, request_id: Uuid) -> Result<RequestDetail, ServiceError> {
        let db = &*self.db_pool;
        let request = relief_request::Entity::find_by_id(request_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Relief request {} not found", request_id)))?;
        let lines = relief_request_item::Entity::find()
            .filter(relief_request_item::Column::RequestId.eq(request_id))
            .order_by_asc(relief_request_item::Column::CreateDtime)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(RequestDetail { request, lines })
    }

    /// Lists requests, most recent request date first.
    #[instrument(skip(self))]
    pub async fn list_requests(
        &self,
        filter: RequestFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<relief_request::Model>, u64), ServiceError> {
        let mut query = relief_request::Entity::find();
        if let Some(statuses) = filter.stage.statuses() {
            query = query.filter(relief_request::Column::StatusCode.is_in(statuses.iter().copied()));
        }
        if let Some(status) = filter.status {
            query = query.filter(relief_request::Column::StatusCode.eq(status));
        }
        if let Some(agency_id) = filter.agency_id {
            query = query.filter(relief_request::Column::AgencyId.eq(agency_id));
        }
        if let Some(event_id) = filter.event_id {
            query = query.filter(relief_request::Column::EventId.eq(event_id));
        }

        let paginator = query
            .order_by_desc(relief_request::Column::RequestDate)
            .order_by_desc(relief_request::Column::CreateDtime)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let requests = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;
        Ok((requests, total))
    }
}

fn check_quantity(quantity: i64) -> Result<(), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::ValidationError(format!(
            "Requested quantity must be greater than zero, got {}",
            quantity
        )));
    }
    Ok(())
}

async fn insert_line<C: ConnectionTrait>(
    conn: &C,
    request_id: Uuid,
    item_id: Uuid,
    quantity: i64,
    urgency: Urgency,
    actor: &str,
) -> Result<relief_request_item::Model, ServiceError> {
    relief_request_item::ActiveModel {
        request_id: Set(request_id),
        item_id: Set(item_id),
        request_qty: Set(quantity),
        urgency_ind: Set(urgency),
        status_code: Set(LineStatus::Requested),
        create_by_id: Set(actor.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(classify_db_error)
}

async fn load_request<C: ConnectionTrait>(
    conn: &C,
    request_id: Uuid,
    expected_version: i32,
) -> Result<relief_request::Model, ServiceError> {
    let request = relief_request::Entity::find_by_id(request_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Relief request {} not found", request_id)))?;
    ensure_version::<relief_request::Entity>(request.id, request.version_nbr, expected_version)?;
    Ok(request)
}

async fn load_editable<C: ConnectionTrait>(
    conn: &C,
    request_id: Uuid,
    expected_version: i32,
) -> Result<relief_request::Model, ServiceError> {
    let request = load_request(conn, request_id, expected_version).await?;
    if !request.status_code.is_editable() {
        return Err(ServiceError::InvalidStatus(format!(
            "Relief request {} is {}; items can only change while it is {}",
            request.id,
            request.status_code,
            RequestStatus::Draft
        )));
    }
    Ok(request)
}

async fn find_line<C: ConnectionTrait>(
    conn: &C,
    request_id: Uuid,
    item_id: Uuid,
) -> Result<Option<relief_request_item::Model>, ServiceError> {
    relief_request_item::Entity::find()
        .filter(relief_request_item::Column::RequestId.eq(request_id))
        .filter(relief_request_item::Column::ItemId.eq(item_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)
}

async fn require_lines<C: ConnectionTrait>(
    conn: &C,
    request: &relief_request::Model,
) -> Result<(), ServiceError> {
    let count = relief_request_item::Entity::find()
        .filter(relief_request_item::Column::RequestId.eq(request.id))
        .count(conn)
        .await
        .map_err(ServiceError::db_error)?;
    if count == 0 {
        return Err(ServiceError::ValidationError(format!(
            "Relief request {} has no items",
            request.id
        )));
    }
    Ok(())
}

async fn touch_request<C: ConnectionTrait>(
    conn: &C,
    request: &relief_request::Model,
    actor: &str,
) -> Result<i32, ServiceError> {
    guarded_update(
        conn,
        request.id,
        request.version_nbr,
        actor,
        VersionedUpdate::<relief_request::Entity>::new(),
    )
    .await
}
