//! DRIMS API Library
//!
//! Disaster relief inventory: warehouses, relief items, agencies, stock
//! levels and the relief packages that reserve and dispatch that stock,
//! plus the disaster events and agency relief requests they answer.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod rules;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::HeaderValue,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: Arc<config::AppConfig>,
    /// Header policy, fixed at startup
    pub security: Arc<config::SecurityConfig>,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<db::DbPool>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            security: Arc::new(config.security.clone()),
            config: Arc::new(config),
            event_sender,
            services,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    let warehouses = Router::new()
        .route(
            "/warehouses",
            post(handlers::warehouses::create_warehouse).get(handlers::warehouses::list_warehouses),
        )
        .route(
            "/warehouses/:id",
            get(handlers::warehouses::get_warehouse).put(handlers::warehouses::update_warehouse),
        );

    let items = Router::new()
        .route(
            "/items",
            post(handlers::items::create_item).get(handlers::items::list_items),
        )
        .route(
            "/items/:id",
            get(handlers::items::get_item).put(handlers::items::update_item),
        );

    let agencies = Router::new()
        .route(
            "/agencies",
            post(handlers::agencies::create_agency).get(handlers::agencies::list_agencies),
        )
        .route(
            "/agencies/form-rules",
            get(handlers::agencies::agency_form_rules_handler),
        )
        .route(
            "/agencies/:id",
            get(handlers::agencies::get_agency).put(handlers::agencies::update_agency),
        );

    let inventory = Router::new()
        .route("/inventory", get(handlers::inventory::list_inventory))
        .route("/inventory/receipts", post(handlers::inventory::receive_stock))
        .route(
            "/inventory/availability",
            get(handlers::inventory::get_availability),
        )
        .route("/inventory/:id", get(handlers::inventory::get_inventory_line))
        .route(
            "/inventory/:id/write-off",
            post(handlers::inventory::write_off_stock),
        );

    let packages = Router::new()
        .route(
            "/packages",
            post(handlers::relief_packages::create_package)
                .get(handlers::relief_packages::list_packages),
        )
        .route("/packages/:id", get(handlers::relief_packages::get_package))
        .route(
            "/packages/:id/reservations",
            get(handlers::relief_packages::list_package_reservations),
        )
        .route(
            "/packages/:id/items",
            put(handlers::relief_packages::set_package_line),
        )
        .route(
            "/packages/:id/items/:item_id",
            delete(handlers::relief_packages::remove_package_line),
        )
        .route(
            "/packages/:id/verify",
            post(handlers::relief_packages::verify_package),
        )
        .route(
            "/packages/:id/dispatch",
            post(handlers::relief_packages::dispatch_package),
        )
        .route(
            "/packages/:id/cancel",
            post(handlers::relief_packages::cancel_package),
        );

    let disaster_events = Router::new()
        .route(
            "/disaster-events",
            post(handlers::disaster_events::create_disaster_event)
                .get(handlers::disaster_events::list_disaster_events),
        )
        .route(
            "/disaster-events/:id",
            get(handlers::disaster_events::get_disaster_event),
        )
        .route(
            "/disaster-events/:id/close",
            post(handlers::disaster_events::close_disaster_event),
        );

    let requests = Router::new()
        .route(
            "/relief-requests",
            post(handlers::relief_requests::create_relief_request)
                .get(handlers::relief_requests::list_relief_requests),
        )
        .route(
            "/relief-requests/:id",
            get(handlers::relief_requests::get_relief_request),
        )
        .route(
            "/relief-requests/:id/items",
            put(handlers::relief_requests::set_relief_request_line),
        )
        .route(
            "/relief-requests/:id/items/:item_id",
            delete(handlers::relief_requests::remove_relief_request_line),
        )
        .route(
            "/relief-requests/:id/submit",
            post(handlers::relief_requests::submit_relief_request),
        )
        .route(
            "/relief-requests/:id/approve",
            post(handlers::relief_requests::approve_relief_request),
        )
        .route(
            "/relief-requests/:id/deny",
            post(handlers::relief_requests::deny_relief_request),
        )
        .route(
            "/relief-requests/:id/cancel",
            post(handlers::relief_requests::cancel_relief_request),
        );

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(warehouses)
        .merge(items)
        .merge(agencies)
        .merge(inventory)
        .merge(packages)
        .merge(disaster_events)
        .merge(requests)
}

/// CORS layer from configuration; `None` when no policy is configured.
pub fn cors_layer(cfg: &config::AppConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            environment = %cfg.environment,
            "Using permissive CORS because explicit origins were not configured"
        );
        Some(CorsLayer::permissive())
    } else {
        None
    }
}

/// Full application: v1 API, OpenAPI document and the middleware stack.
pub fn app_router(state: AppState) -> Result<Router, errors::ServiceError> {
    let cors = cors_layer(&state.config).ok_or_else(|| {
        errors::ServiceError::InternalError(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
                .to_string(),
        )
    })?;
    let security = state.security.clone();

    Ok(Router::<AppState>::new()
        .route("/", get(|| async { "drims-api up" }))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest("/api/v1", api_v1_routes())
        .layer(axum::middleware::from_fn_with_state(
            security,
            middleware_helpers::security_headers::security_headers_middleware,
        ))
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Outermost so the trace span and error bodies see the request id
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state))
}

async fn api_status(State(state): State<AppState>) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "drims-api",
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(err) => {
            ::tracing::warn!(error = %err, "Health check: database unreachable");
            "unhealthy"
        }
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

pub mod prelude {
    pub use crate::auth::Actor;
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::services::*;
    pub use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}
