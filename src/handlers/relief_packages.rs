use super::{created, paginated, Created, PageQuery};
use crate::{
    auth::Actor,
    entities::{
        inventory_reservation,
        relief_package::{self, PackageStatus},
    },
    errors::ServiceError,
    services::relief_packages::{CreatePackage, PackageDetail, PackageFilter},
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
pub struct PackageListQuery {
    pub status: Option<PackageStatus>,
    pub agency_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePackageRequest {
    /// Receiving agency
    pub agency_id: Uuid,
    /// Warehouse the stock is reserved from
    pub warehouse_id: Uuid,
    #[validate(length(max = 1000))]
    pub comments_text: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPackageLineRequest {
    /// Package version the client last read
    #[validate(range(min = 1))]
    pub version_nbr: i32,
    pub item_id: Uuid,
    #[validate(range(min = 1, max = 1000000000))]
    #[schema(example = 40, maximum = 1000000000)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PackageVersionQuery {
    #[validate(range(min = 1))]
    pub version_nbr: i32,
}

/// Body of the verify, dispatch and cancel transitions.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PackageTransitionRequest {
    #[validate(range(min = 1))]
    pub version_nbr: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/packages",
    request_body = CreatePackageRequest,
    responses(
        (status = 201, description = "Draft package created", body = ApiResponse<relief_package::Model>),
        (status = 400, description = "Inactive agency or warehouse", body = crate::errors::ErrorResponse),
        (status = 404, description = "Agency or warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn create_package(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreatePackageRequest>,
) -> Result<Created<relief_package::Model>, ServiceError> {
    payload.validate()?;
    let input = CreatePackage {
        agency_id: payload.agency_id,
        warehouse_id: payload.warehouse_id,
        comments_text: payload.comments_text,
    };
    let package = state
        .services
        .packages
        .create_package(input, actor.as_str())
        .await?;
    Ok(created(package))
}

#[utoipa::path(
    get,
    path = "/api/v1/packages",
    params(PackageListQuery, PageQuery),
    responses(
        (status = 200, description = "Packages listed", body = ApiResponse<PaginatedResponse<relief_package::Model>>)
    ),
    tag = "packages"
)]
pub async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<PackageListQuery>,
    Query(paging): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<relief_package::Model>> {
    let (page, limit) = paging.resolve(&state);
    let filter = PackageFilter {
        status: query.status,
        agency_id: query.agency_id,
        warehouse_id: query.warehouse_id,
    };
    let (packages, total) = state
        .services
        .packages
        .list_packages(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        packages, total, page, limit,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/packages/:id",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package with lines and reservations", body = ApiResponse<PackageDetail>),
        (status = 404, description = "Package not found", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PackageDetail> {
    let package = state.services.packages.get_package(id).await?;
    Ok(Json(ApiResponse::success(package)))
}

#[utoipa::path(
    get,
    path = "/api/v1/packages/:id/reservations",
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Stock held by the package", body = ApiResponse<Vec<inventory_reservation::Model>>),
        (status = 404, description = "Package not found", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn list_package_reservations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<inventory_reservation::Model>> {
    let held = state.services.reservations.reservations_for_package(id).await?;
    Ok(Json(ApiResponse::success(held)))
}

#[utoipa::path(
    put,
    path = "/api/v1/packages/:id/items",
    request_body = SetPackageLineRequest,
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Line set and stock reserved", body = ApiResponse<PackageDetail>),
        (status = 400, description = "Package is not a draft", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale package version", body = crate::errors::ErrorResponse),
        (status = 422, description = "Not enough stock", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn set_package_line(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPackageLineRequest>,
) -> ApiResult<PackageDetail> {
    payload.validate()?;
    let package = state
        .services
        .packages
        .set_line(
            id,
            payload.version_nbr,
            payload.item_id,
            payload.quantity,
            actor.as_str(),
        )
        .await?;
    Ok(Json(ApiResponse::success(package)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/packages/:id/items/:item_id",
    params(
        ("id" = Uuid, Path, description = "Package ID"),
        ("item_id" = Uuid, Path, description = "Item ID"),
        PackageVersionQuery
    ),
    responses(
        (status = 200, description = "Line removed and reservation released", body = ApiResponse<PackageDetail>),
        (status = 404, description = "Line not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale package version", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn remove_package_line(
    State(state): State<AppState>,
    actor: Actor,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Query(version): Query<PackageVersionQuery>,
) -> ApiResult<PackageDetail> {
    version.validate()?;
    let package = state
        .services
        .packages
        .remove_line(id, version.version_nbr, item_id, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(package)))
}

#[utoipa::path(
    post,
    path = "/api/v1/packages/:id/verify",
    request_body = PackageTransitionRequest,
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package verified", body = ApiResponse<relief_package::Model>),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale package version", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn verify_package(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<PackageTransitionRequest>,
) -> ApiResult<relief_package::Model> {
    payload.validate()?;
    let package = state
        .services
        .packages
        .verify(id, payload.version_nbr, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(package)))
}

#[utoipa::path(
    post,
    path = "/api/v1/packages/:id/dispatch",
    request_body = PackageTransitionRequest,
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package dispatched and stock consumed", body = ApiResponse<relief_package::Model>),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale package version", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn dispatch_package(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<PackageTransitionRequest>,
) -> ApiResult<relief_package::Model> {
    payload.validate()?;
    let package = state
        .services
        .packages
        .dispatch(id, payload.version_nbr, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(package)))
}

#[utoipa::path(
    post,
    path = "/api/v1/packages/:id/cancel",
    request_body = PackageTransitionRequest,
    params(("id" = Uuid, Path, description = "Package ID")),
    responses(
        (status = 200, description = "Package cancelled and reservations released", body = ApiResponse<relief_package::Model>),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale package version", body = crate::errors::ErrorResponse)
    ),
    tag = "packages"
)]
pub async fn cancel_package(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<PackageTransitionRequest>,
) -> ApiResult<relief_package::Model> {
    payload.validate()?;
    let package = state
        .services
        .packages
        .cancel(id, payload.version_nbr, actor.as_str())
        .await?;
    Ok(Json(ApiResponse::success(package)))
}
