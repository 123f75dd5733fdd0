use super::{created, paginated, Created, PageQuery};
use crate::{
    auth::Actor,
    entities::relief_request::{self, RequestStage, RequestStatus, Urgency},
    errors::ServiceError,
    services::relief_requests::{NewReliefRequest, NewRequestLine, RequestDetail, RequestFilter},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestListQuery {
    /// `pending` (draft, awaiting approval, submitted), `completed` (closed,
    /// filled) or `all`
    pub stage: Option<RequestStage>,
    pub status: Option<RequestStatus>,
    pub agency_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RequestLineRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1, max = 1000000000))]
    #[schema(example = 250, maximum = 1000000000)]
    pub quantity: i64,
    pub urgency_ind: Option<Urgency>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReliefRequestRequest {
    pub agency_id: Uuid,
    /// Must be an active disaster event when given
    pub event_id: Option<Uuid>,
    #[schema(example = "2025-10-29")]
    pub request_date: NaiveDate,
    pub urgency_ind: Urgency,
    #[validate(length(max = 1000))]
    pub comments_text: Option<String>,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub lines: Vec<RequestLineRequest>,
}

impl From<CreateReliefRequestRequest> for NewReliefRequest {
    fn from(req: CreateReliefRequestRequest) -> Self {
        Self {
            agency_id: req.agency_id,
            event_id: req.event_id,
            request_date: req.request_date,
            urgency_ind: req.urgency_ind,
            comments_text: req.comments_text,
            lines: req
                .lines
                .into_iter()
                .map(|line| NewRequestLine {
                    item_id: line.item_id,
                    quantity: line.quantity,
                    urgency_ind: line.urgency_ind,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetRequestLineRequest {
    /// Request version the client last read
    #[validate(range(min = 1))]
    pub version_nbr: i32,
    pub item_id: Uuid,
    #[validate(range(min = 1, max = 1000000000))]
    #[schema(maximum = 1000000000)]
    pub quantity: i64,
    pub urgency_ind: Option<Urgency>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestVersionQuery {
    #[validate(range(min = 1))]
    pub version_nbr: i32,
}

/// Body of the submit, approve, deny and cancel transitions.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestTransitionRequest {
    #[validate(range(min = 1))]
    pub version_nbr: i32,
    /// Required to deny; optional when cancelling
    #[validate(length(max = 255))]
    pub reason_desc: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/relief-requests",
    request_body = CreateReliefRequestRequest,
    responses(
        (status = 201, description = "Draft request created", body = ApiResponse<RequestDetail>),
        (status = 400, description = "Invalid lines, inactive agency or closed event", body = crate::errors::ErrorResponse),
        (status = 404, description = "Agency, event or item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "relief-requests"
)]
pub async fn create_relief_request(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateReliefRequestRequest>,
) -> Result<Created<RequestDetail>, ServiceError> {
    payload.validate()?;
    for line in &payload.lines {
        line.validate()?;
    }
    let request = state
        .services
        .requests
        .create_request(payload.into(), actor.as_str())
        .await?;
    Ok(created(request))
}

#[utoipa::path(
    get,
    path = "/api/v1/relief-requests",
    params(RequestListQuery, PageQuery),
    responses(
        (status = 200, description = "Requests listed", body = ApiResponse<PaginatedResponse<relief_request::Model>>)
    ),
    tag = "relief-requests"
)]
pub async fn list_relief_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<relief_request::Model>> {
    let (page, limit) = paging.resolve(&state);
    let filter = RequestFilter {
        stage: query.stage.unwrap_or_default(),
        status: query.status,
        agency_id: query.agency_id,
        event_id: query.event_id,
    };
    let (requests, total) = state
        .services
        .requests
        .list_requests(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        requests, total, page, limit,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/relief-requests/:id",
    params(("id" = Uuid, Path, description = "Relief request ID")),
    responses(
        (status = 200, description = "Request with its lines", body = ApiResponse<RequestDetail>),
        (status = 404, description = "Request not found", body = crate::errors::ErrorResponse)
    ),
    tag = "relief-requests"
)]
pub async fn get_relief_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<RequestDetail> {
    let request = state.services.requests.get_request(id).await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    put,
    path = "/api/v1/relief-requests/:id/items",
    request_body = SetRequestLineRequest,
    params(("id" = Uuid, Path, description = "Relief request ID")),
    responses(
        (status = 200, description = "Line added or changed", body = ApiResponse<RequestDetail>),
        (status = 400, description = "Request is no longer a draft", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale request version", body = crate::errors::ErrorResponse)
    ),
    tag = "relief-requests"
)]
pub async fn set_relief_request_line(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRequestLineRequest>,
) -> ApiResult<RequestDetail> {
    payload.validate()?;
    let request = state
        .services
        .requests
        .set_line(
            id,
            payload.version_nbr,
            payload.item_id,
            payload.quantity,
            payload.urgency_ind,
            actor.as_str(),
        )
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/relief-requests/:id/items/:item_id",
    params(
        ("id" = Uuid, Path, description = "Relief request ID"),
        ("item_id" = Uuid, Path, description = "Item ID"),
        RequestVersionQuery
    ),
    responses(
        (status = 200, description = "Line removed", body = ApiResponse<RequestDetail>),
        (status = 404, description = "Line not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale request version", body = crate::errors::ErrorResponse)
    ),
    tag = "relief-requests"
)]
pub async fn remove_relief_request_line(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Query(version): Query<RequestVersionQuery>,
) -> ApiResult<RequestDetail> {
    version.validate()?;
    let request = state
        .services
        .requests
        .remove_line(id, version.version_nbr, item_id, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    post,
    path = "/api/v1/relief-requests/:id/submit",
    request_body = RequestTransitionRequest,
    params(("id" = Uuid, Path, description = "Relief request ID")),
    responses(
        (status = 200, description = "Request sent for approval", body = ApiResponse<relief_request::Model>),
        (status = 400, description = "Transition not allowed or no lines", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale request version", body = crate::errors::ErrorResponse)
    ),
    tag = "relief-requests"
)]
pub async fn submit_relief_request(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestTransitionRequest>,
) -> ApiResult<relief_request::Model> {
    payload.validate()?;
    let request = state
        .services
        .requests
        .submit(id, payload.version_nbr, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    post,
    path = "/api/v1/relief-requests/:id/approve",
    request_body = RequestTransitionRequest,
    params(("id" = Uuid, Path, description = "Relief request ID")),
    responses(
        (status = 200, description = "Request approved", body = ApiResponse<relief_request::Model>),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale request version", body = crate::errors::ErrorResponse)
    ),
    tag = "relief-requests"
)]
pub async fn approve_relief_request(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestTransitionRequest>,
) -> ApiResult<relief_request::Model> {
    payload.validate()?;
    let request = state
        .services
        .requests
        .approve(id, payload.version_nbr, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    post,
    path = "/api/v1/relief-requests/:id/deny",
    request_body = RequestTransitionRequest,
    params(("id" = Uuid, Path, description = "Relief request ID")),
    responses(
        (status = 200, description = "Request denied", body = ApiResponse<relief_request::Model>),
        (status = 400, description = "Transition not allowed or reason missing", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale request version", body = crate::errors::ErrorResponse)
    ),
    tag = "relief-requests"
)]
pub async fn deny_relief_request(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestTransitionRequest>,
) -> ApiResult<relief_request::Model> {
    payload.validate()?;
    let request = state
        .services
        .requests
        .deny(
            id,
            payload.version_nbr,
            payload.reason_desc.unwrap_or_default(),
            actor.as_str(),
        )
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

#[utoipa::path(
    post,
    path = "/api/v1/relief-requests/:id/cancel",
    request_body = RequestTransitionRequest,
    params(("id" = Uuid, Path, description = "Relief request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = ApiResponse<relief_request::Model>),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale request version", body = crate::errors::ErrorResponse)
    ),
    tag = "relief-requests"
)]
pub async fn cancel_relief_request(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestTransitionRequest>,
) -> ApiResult<relief_request::Model> {
    payload.validate()?;
    let request = state
        .services
        .requests
        .cancel(id, payload.version_nbr, payload.reason_desc, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(request)))
}
