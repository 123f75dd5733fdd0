pub mod agencies;
pub mod disaster_events;
pub mod inventory;
pub mod items;
pub mod relief_packages;
pub mod relief_requests;
pub mod warehouses;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    agencies::AgencyService, disaster_events::DisasterEventService, inventory::InventoryService,
    inventory_reservation_service::InventoryReservationService, items::ItemService,
    relief_packages::ReliefPackageService, relief_requests::ReliefRequestService,
    warehouses::WarehouseService,
};
use crate::{ApiResponse, PaginatedResponse};
use axum::{http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub warehouses: Arc<WarehouseService>,
    pub items: Arc<ItemService>,
    pub agencies: Arc<AgencyService>,
    pub inventory: Arc<InventoryService>,
    pub reservations: Arc<InventoryReservationService>,
    pub packages: Arc<ReliefPackageService>,
    pub disaster_events: Arc<DisasterEventService>,
    pub requests: Arc<ReliefRequestService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            warehouses: Arc::new(WarehouseService::new(db_pool.clone())),
            items: Arc::new(ItemService::new(db_pool.clone())),
            agencies: Arc::new(AgencyService::new(db_pool.clone())),
            inventory: Arc::new(InventoryService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            reservations: Arc::new(InventoryReservationService::new(db_pool.clone())),
            packages: Arc::new(ReliefPackageService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            disaster_events: Arc::new(DisasterEventService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            requests: Arc::new(ReliefRequestService::new(db_pool, event_sender)),
        }
    }
}

/// Page selection shared by the list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, capped by configuration
    pub limit: Option<u64>,
}

impl PageQuery {
    /// Resolves `(page, limit)` against the configured defaults.
    pub fn resolve(&self, state: &AppState) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        (page, state.config.page_size(self.limit))
    }
}

pub(crate) fn paginated<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> PaginatedResponse<T> {
    let total_pages = if limit == 0 { 0 } else { (total + limit - 1) / limit };
    PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}

pub(crate) type Created<T> = (StatusCode, Json<ApiResponse<T>>);

pub(crate) fn created<T>(data: T) -> Created<T> {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = paginated(vec![1, 2, 3], 41, 1, 20);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 3);
        assert_eq!(paginated(Vec::<u8>::new(), 0, 1, 20).total_pages, 0);
    }
}
