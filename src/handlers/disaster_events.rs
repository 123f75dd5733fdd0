use super::{created, paginated, Created, PageQuery};
use crate::{
    auth::Actor,
    entities::disaster_event::{self, EventStatus, EventType},
    errors::ServiceError,
    services::disaster_events::NewDisasterEvent,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DisasterEventListQuery {
    /// `A` active or `C` closed
    pub status: Option<EventStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDisasterEventRequest {
    /// Stored upper-cased; must be unique
    #[validate(length(min = 1, max = 60))]
    #[schema(example = "HURRICANE MELISSA")]
    pub event_name: String,
    pub event_type: EventType,
    #[schema(example = "2025-10-28")]
    pub start_date: NaiveDate,
    #[validate(length(min = 1, max = 4000))]
    pub event_desc: String,
    #[validate(length(max = 4000))]
    pub impact_desc: Option<String>,
}

impl From<CreateDisasterEventRequest> for NewDisasterEvent {
    fn from(req: CreateDisasterEventRequest) -> Self {
        Self {
            event_name: req.event_name,
            event_type: req.event_type,
            start_date: req.start_date,
            event_desc: req.event_desc,
            impact_desc: req.impact_desc,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CloseDisasterEventRequest {
    #[validate(range(min = 1))]
    pub version_nbr: i32,
    /// Defaults to "Closed by user"
    #[validate(length(max = 255))]
    pub reason_desc: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/disaster-events",
    request_body = CreateDisasterEventRequest,
    responses(
        (status = 201, description = "Event opened", body = ApiResponse<disaster_event::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "disaster-events"
)]
pub async fn create_disaster_event(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateDisasterEventRequest>,
) -> Result<Created<disaster_event::Model>, ServiceError> {
    payload.validate()?;
    let event = state
        .services
        .disaster_events
        .create_event(payload.into(), actor.as_str())
        .await?;
    Ok(created(event))
}

#[utoipa::path(
    get,
    path = "/api/v1/disaster-events",
    params(DisasterEventListQuery, PageQuery),
    responses(
        (status = 200, description = "Events listed", body = ApiResponse<PaginatedResponse<disaster_event::Model>>)
    ),
    tag = "disaster-events"
)]
pub async fn list_disaster_events(
    State(state): State<AppState>,
    Query(query): Query<DisasterEventListQuery>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<disaster_event::Model>> {
    let (page, limit) = paging.resolve(&state);
    let (events, total) = state
        .services
        .disaster_events
        .list_events(query.status, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(events, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/v1/disaster-events/:id",
    params(("id" = Uuid, Path, description = "Disaster event ID")),
    responses(
        (status = 200, description = "Event fetched", body = ApiResponse<disaster_event::Model>),
        (status = 404, description = "Event not found", body = crate::errors::ErrorResponse)
    ),
    tag = "disaster-events"
)]
pub async fn get_disaster_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<disaster_event::Model> {
    let event = state.services.disaster_events.get_event(id).await?;
    Ok(Json(ApiResponse::success(event)))
}

#[utoipa::path(
    post,
    path = "/api/v1/disaster-events/:id/close",
    request_body = CloseDisasterEventRequest,
    params(("id" = Uuid, Path, description = "Disaster event ID")),
    responses(
        (status = 200, description = "Event closed", body = ApiResponse<disaster_event::Model>),
        (status = 400, description = "Event already closed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale event version", body = crate::errors::ErrorResponse)
    ),
    tag = "disaster-events"
)]
pub async fn close_disaster_event(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloseDisasterEventRequest>,
) -> ApiResult<disaster_event::Model> {
    payload.validate()?;
    let event = state
        .services
        .disaster_events
        .close_event(id, payload.version_nbr, payload.reason_desc, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(event)))
}
