use super::{created, paginated, Created, PageQuery};
use crate::{
    auth::Actor,
    entities::{warehouse, RecordStatus},
    errors::ServiceError,
    services::warehouses::{NewWarehouse, WarehouseChanges},
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
pub struct WarehouseListQuery {
    /// `A` active or `I` inactive
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWarehouseRequest {
    /// Stored upper-cased; must be unique
    #[validate(length(min = 1, max = 120))]
    #[schema(example = "KINGSTON CENTRAL DEPOT")]
    pub warehouse_name: String,
    #[validate(length(min = 1, max = 32))]
    #[schema(example = "MAIN-HUB")]
    pub warehouse_type: String,
    #[validate(length(max = 32))]
    pub phone_no: Option<String>,
}

impl From<CreateWarehouseRequest> for NewWarehouse {
    fn from(req: CreateWarehouseRequest) -> Self {
        Self {
            warehouse_name: req.warehouse_name,
            warehouse_type: req.warehouse_type,
            phone_no: req.phone_no,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWarehouseRequest {
    /// Version the client last read
    #[validate(range(min = 1))]
    pub version_nbr: i32,
    #[validate(length(min = 1, max = 120))]
    pub warehouse_name: String,
    #[validate(length(min = 1, max = 32))]
    pub warehouse_type: String,
    #[validate(length(max = 32))]
    pub phone_no: Option<String>,
    pub status_code: RecordStatus,
}

impl From<UpdateWarehouseRequest> for WarehouseChanges {
    fn from(req: UpdateWarehouseRequest) -> Self {
        Self {
            version_nbr: req.version_nbr,
            warehouse_name: req.warehouse_name,
            warehouse_type: req.warehouse_type,
            phone_no: req.phone_no,
            status_code: req.status_code,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    request_body = CreateWarehouseRequest,
    responses(
        (status = 201, description = "Warehouse created", body = ApiResponse<warehouse::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateWarehouseRequest>,
) -> Result<Created<warehouse::Model>, ServiceError> {
    payload.validate()?;
    let warehouse = state
        .services
        .warehouses
        .create_warehouse(payload.into(), actor.as_str())
        .await?;
    Ok(created(warehouse))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses",
    params(WarehouseListQuery, PageQuery),
    responses(
        (status = 200, description = "Warehouses listed", body = ApiResponse<PaginatedResponse<warehouse::Model>>)
    ),
    tag = "warehouses"
)]
pub async fn list_warehouses(
    State(state): State<AppState>,
    Query(query): Query<WarehouseListQuery>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<warehouse::Model>> {
    let (page, limit) = paging.resolve(&state);
    let (warehouses, total) = state
        .services
        .warehouses
        .list_warehouses(query.status, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        warehouses, total, page, limit,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses/:id",
    params(("id" = Uuid, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Warehouse fetched", body = ApiResponse<warehouse::Model>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<warehouse::Model> {
    let warehouse = state.services.warehouses.get_warehouse(id).await?;
    Ok(Json(ApiResponse::success(warehouse)))
}

#[utoipa::path(
    put,
    path = "/api/v1/warehouses/:id",
    request_body = UpdateWarehouseRequest,
    params(("id" = Uuid, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Warehouse updated", body = ApiResponse<warehouse::Model>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale version or name in use", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn update_warehouse(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWarehouseRequest>,
) -> ApiResult<warehouse::Model> {
    payload.validate()?;
    let warehouse = state
        .services
        .warehouses
        .update_warehouse(id, payload.into(), actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(warehouse)))
}
