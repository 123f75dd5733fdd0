use super::{created, paginated, Created, PageQuery};
use crate::{
    auth::Actor,
    entities::{item, RecordStatus},
    errors::ServiceError,
    services::items::{ItemChanges, NewItem},
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
pub struct ItemListQuery {
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 120))]
    #[schema(example = "BOTTLED WATER 1L")]
    pub item_name: String,
    /// Stored upper-cased; must be unique
    #[validate(length(min = 1, max = 40))]
    #[schema(example = "WTR-1L")]
    pub sku_code: String,
    pub item_desc: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub reorder_qty: i64,
}

impl From<CreateItemRequest> for NewItem {
    fn from(req: CreateItemRequest) -> Self {
        Self {
            item_name: req.item_name,
            sku_code: req.sku_code,
            item_desc: req.item_desc,
            reorder_qty: req.reorder_qty,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[validate(range(min = 1))]
    pub version_nbr: i32,
    #[validate(length(min = 1, max = 120))]
    pub item_name: String,
    #[validate(length(min = 1, max = 40))]
    pub sku_code: String,
    pub item_desc: Option<String>,
    #[validate(range(min = 0))]
    pub reorder_qty: i64,
    pub status_code: RecordStatus,
}

impl From<UpdateItemRequest> for ItemChanges {
    fn from(req: UpdateItemRequest) -> Self {
        Self {
            version_nbr: req.version_nbr,
            item_name: req.item_name,
            sku_code: req.sku_code,
            item_desc: req.item_desc,
            reorder_qty: req.reorder_qty,
            status_code: req.status_code,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<item::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateItemRequest>,
) -> Result<Created<item::Model>, ServiceError> {
    payload.validate()?;
    let item = state
        .services
        .items
        .create_item(payload.into(), actor.as_str())
        .await?;
    Ok(created(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ItemListQuery, PageQuery),
    responses(
        (status = 200, description = "Items listed", body = ApiResponse<PaginatedResponse<item::Model>>)
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<item::Model>> {
    let (page, limit) = paging.resolve(&state);
    let (items, total) = state
        .services
        .items
        .list_items(query.status, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(items, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/v1/items/:id",
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item fetched", body = ApiResponse<item::Model>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn get_item(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<item::Model> {
    let item = state.services.items.get_item(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    put,
    path = "/api/v1/items/:id",
    request_body = UpdateItemRequest,
    params(("id" = Uuid, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<item::Model>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale version or SKU in use", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> ApiResult<item::Model> {
    payload.validate()?;
    let item = state
        .services
        .items
        .update_item(id, payload.into(), actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(item)))
}
