use super::{created, paginated, Created, PageQuery};
use crate::{
    auth::Actor,
    entities::inventory_balance::{self, InventoryStatus},
    errors::ServiceError,
    services::inventory::{InventoryFilter, StockReceipt, WriteOff},
    services::inventory_reservation_service::Availability,
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryListQuery {
    pub warehouse_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    /// `A` available or `U` unavailable
    pub status: Option<InventoryStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveStockRequest {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    #[validate(range(min = 1, max = 1000000000))]
    #[schema(example = 250, maximum = 1000000000)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_write_off"))]
pub struct WriteOffRequest {
    #[validate(range(min = 1))]
    pub version_nbr: i32,
    #[validate(range(min = 0, max = 1000000000))]
    #[serde(default)]
    pub defective_qty: i64,
    #[validate(range(min = 0, max = 1000000000))]
    #[serde(default)]
    pub expired_qty: i64,
}

fn validate_write_off(req: &WriteOffRequest) -> Result<(), ValidationError> {
    let total = req.defective_qty.checked_add(req.expired_qty);
    if total.map_or(false, |total| total <= 0) {
        let mut err = ValidationError::new("empty_write_off");
        err.message = Some("Write off at least one defective or expired unit".into());
        return Err(err);
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/receipts",
    request_body = ReceiveStockRequest,
    responses(
        (status = 201, description = "Stock received", body = ApiResponse<inventory_balance::Model>),
        (status = 400, description = "Invalid request or inactive warehouse/item", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent change to the inventory line", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn receive_stock(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<ReceiveStockRequest>,
) -> Result<Created<inventory_balance::Model>, ServiceError> {
    payload.validate()?;
    let receipt = StockReceipt {
        warehouse_id: payload.warehouse_id,
        item_id: payload.item_id,
        quantity: payload.quantity,
    };
    let line = state
        .services
        .inventory
        .receive_stock(receipt, actor.as_str())
        .await?;
    Ok(created(line))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(InventoryListQuery, PageQuery),
    responses(
        (status = 200, description = "Inventory lines listed", body = ApiResponse<PaginatedResponse<inventory_balance::Model>>)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<InventoryListQuery>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<inventory_balance::Model>> {
    let (page, limit) = paging.resolve(&state);
    let filter = InventoryFilter {
        warehouse_id: query.warehouse_id,
        item_id: query.item_id,
        status: query.status,
    };
    let (lines, total) = state
        .services
        .inventory
        .list_inventory(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(lines, total, page, limit))))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Reservable stock", body = ApiResponse<Availability>)
    ),
    tag = "inventory"
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Availability> {
    let availability = state
        .services
        .reservations
        .availability(query.warehouse_id, query.item_id)
        .await?;
    Ok(Json(ApiResponse::success(availability)))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/:id",
    params(("id" = Uuid, Path, description = "Inventory line ID")),
    responses(
        (status = 200, description = "Inventory line fetched", body = ApiResponse<inventory_balance::Model>),
        (status = 404, description = "Inventory line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory_line(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<inventory_balance::Model> {
    let line = state.services.inventory.get_line(id).await?;
    Ok(Json(ApiResponse::success(line)))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/:id/write-off",
    request_body = WriteOffRequest,
    params(("id" = Uuid, Path, description = "Inventory line ID")),
    responses(
        (status = 200, description = "Stock written off", body = ApiResponse<inventory_balance::Model>),
        (status = 409, description = "Stale version", body = crate::errors::ErrorResponse),
        (status = 422, description = "Write-off exceeds unreserved stock", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn write_off_stock(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<WriteOffRequest>,
) -> ApiResult<inventory_balance::Model> {
    payload.validate()?;
    let write_off = WriteOff {
        version_nbr: payload.version_nbr,
        defective_qty: payload.defective_qty,
        expired_qty: payload.expired_qty,
    };
    let line = state
        .services
        .inventory
        .write_off(id, write_off, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(line)))
}
