use super::{created, paginated, Created, PageQuery};
use crate::{
    auth::Actor,
    entities::{agency, agency::AgencyType, RecordStatus},
    errors::ServiceError,
    rules::{agency_form_rules, AgencyFormRule},
    services::agencies::{AgencyChanges, AgencyFilter, NewAgency},
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AgencyListQuery {
    pub agency_type: Option<AgencyType>,
    pub warehouse_id: Option<Uuid>,
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAgencyRequest {
    #[validate(length(min = 1, max = 120))]
    #[schema(example = "PORTMORE COMMUNITY SHELTER")]
    pub agency_name: String,
    pub agency_type: AgencyType,
    /// Required for DISTRIBUTOR, forbidden for SHELTER
    pub warehouse_id: Option<Uuid>,
    #[validate(length(max = 120))]
    pub contact_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone_no: Option<String>,
    #[validate(email)]
    pub email_text: Option<String>,
}

impl From<CreateAgencyRequest> for NewAgency {
    fn from(req: CreateAgencyRequest) -> Self {
        Self {
            agency_name: req.agency_name,
            agency_type: req.agency_type,
            warehouse_id: req.warehouse_id,
            contact_name: req.contact_name,
            phone_no: req.phone_no,
            email_text: req.email_text,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAgencyRequest {
    #[validate(range(min = 1))]
    pub version_nbr: i32,
    #[validate(length(min = 1, max = 120))]
    pub agency_name: String,
    pub agency_type: AgencyType,
    pub warehouse_id: Option<Uuid>,
    #[validate(length(max = 120))]
    pub contact_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone_no: Option<String>,
    #[validate(email)]
    pub email_text: Option<String>,
    pub status_code: RecordStatus,
}

impl From<UpdateAgencyRequest> for AgencyChanges {
    fn from(req: UpdateAgencyRequest) -> Self {
        Self {
            version_nbr: req.version_nbr,
            agency_name: req.agency_name,
            agency_type: req.agency_type,
            warehouse_id: req.warehouse_id,
            contact_name: req.contact_name,
            phone_no: req.phone_no,
            email_text: req.email_text,
            status_code: req.status_code,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/agencies",
    request_body = CreateAgencyRequest,
    responses(
        (status = 201, description = "Agency created", body = ApiResponse<agency::Model>),
        (status = 400, description = "Invalid request or agency/warehouse mismatch", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "agencies"
)]
pub async fn create_agency(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateAgencyRequest>,
) -> Result<Created<agency::Model>, ServiceError> {
    payload.validate()?;
    let agency = state
        .services
        .agencies
        .create_agency(payload.into(), actor.as_str())
        .await?;
    Ok(created(agency))
}

#[utoipa::path(
    get,
    path = "/api/v1/agencies",
    params(AgencyListQuery, PageQuery),
    responses(
        (status = 200, description = "Agencies listed", body = ApiResponse<PaginatedResponse<agency::Model>>)
    ),
    tag = "agencies"
)]
pub async fn list_agencies(
    State(state): State<AppState>,
    Query(query): Query<AgencyListQuery>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<agency::Model>> {
    let (page, limit) = paging.resolve(&state);
    let filter = AgencyFilter {
        agency_type: query.agency_type,
        warehouse_id: query.warehouse_id,
        status: query.status,
    };
    let (agencies, total) = state
        .services
        .agencies
        .list_agencies(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        agencies, total, page, limit,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/agencies/:id",
    params(("id" = Uuid, Path, description = "Agency ID")),
    responses(
        (status = 200, description = "Agency fetched", body = ApiResponse<agency::Model>),
        (status = 404, description = "Agency not found", body = crate::errors::ErrorResponse)
    ),
    tag = "agencies"
)]
pub async fn get_agency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<agency::Model> {
    let agency = state.services.agencies.get_agency(id).await?;
    Ok(Json(ApiResponse::success(agency)))
}

#[utoipa::path(
    put,
    path = "/api/v1/agencies/:id",
    request_body = UpdateAgencyRequest,
    params(("id" = Uuid, Path, description = "Agency ID")),
    responses(
        (status = 200, description = "Agency updated", body = ApiResponse<agency::Model>),
        (status = 400, description = "Agency/warehouse mismatch", body = crate::errors::ErrorResponse),
        (status = 404, description = "Agency not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale version or name in use", body = crate::errors::ErrorResponse)
    ),
    tag = "agencies"
)]
pub async fn update_agency(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAgencyRequest>,
) -> ApiResult<agency::Model> {
    payload.validate()?;
    let agency = state
        .services
        .agencies
        .update_agency(id, payload.into(), actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(agency)))
}

/// How the warehouse field behaves for each agency type.
#[utoipa::path(
    get,
    path = "/api/v1/agencies/form-rules",
    responses(
        (status = 200, description = "Warehouse field rules per agency type", body = ApiResponse<Vec<AgencyFormRule>>)
    ),
    tag = "agencies"
)]
pub async fn agency_form_rules_handler() -> ApiResult<Vec<AgencyFormRule>> {
    Ok(Json(ApiResponse::success(agency_form_rules())))
}
