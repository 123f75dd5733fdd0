use crate::handlers;
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DRIMS API",
        version = "0.4.0",
        description = r#"
# Disaster Relief Inventory Management API

Warehouses, relief items, agencies, stock levels and relief packages.

## Identity

Requests pass through an authenticating gateway which forwards the user id in
the `x-user-id` header. Write endpoints reject requests without it (401); the
id is stored in the audit columns of every row written.

## Versions

Every record carries `version_nbr`. Updates and package transitions must send
the version the client last read. If someone else changed the record in the
meantime the request fails with 409 and the client must reload and retry.

## Reservations

Adding an item to a draft package reserves stock in the package's source
warehouse. Requests that exceed the unreserved stock fail with 422.
Dispatching consumes the reservations; cancelling releases them.

## Events and requests

Agencies raise relief requests, optionally against an active disaster event.
A draft request is submitted for approval and then approved or denied.
Closed events accept no new requests.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "warehouses", description = "Warehouse master data"),
        (name = "items", description = "Relief item master data"),
        (name = "agencies", description = "Distributor and shelter agencies"),
        (name = "inventory", description = "Stock receipts, write-offs and availability"),
        (name = "packages", description = "Relief package lifecycle"),
        (name = "disaster-events", description = "Disasters that relief is raised against"),
        (name = "relief-requests", description = "Agency relief requests and their approval")
    ),
    paths(
        handlers::warehouses::create_warehouse,
        handlers::warehouses::list_warehouses,
        handlers::warehouses::get_warehouse,
        handlers::warehouses::update_warehouse,
        handlers::items::create_item,
        handlers::items::list_items,
        handlers::items::get_item,
        handlers::items::update_item,
        handlers::agencies::create_agency,
        handlers::agencies::list_agencies,
        handlers::agencies::get_agency,
        handlers::agencies::update_agency,
        handlers::agencies::agency_form_rules_handler,
        handlers::inventory::receive_stock,
        handlers::inventory::list_inventory,
        handlers::inventory::get_availability,
        handlers::inventory::get_inventory_line,
        handlers::inventory::write_off_stock,
        handlers::relief_packages::create_package,
        handlers::relief_packages::list_packages,
        handlers::relief_packages::get_package,
        handlers::relief_packages::list_package_reservations,
        handlers::relief_packages::set_package_line,
        handlers::relief_packages::remove_package_line,
        handlers::relief_packages::verify_package,
        handlers::relief_packages::dispatch_package,
        handlers::relief_packages::cancel_package,
        handlers::disaster_events::create_disaster_event,
        handlers::disaster_events::list_disaster_events,
        handlers::disaster_events::get_disaster_event,
        handlers::disaster_events::close_disaster_event,
        handlers::relief_requests::create_relief_request,
        handlers::relief_requests::list_relief_requests,
        handlers::relief_requests::get_relief_request,
        handlers::relief_requests::set_relief_request_line,
        handlers::relief_requests::remove_relief_request_line,
        handlers::relief_requests::submit_relief_request,
        handlers::relief_requests::approve_relief_request,
        handlers::relief_requests::deny_relief_request,
        handlers::relief_requests::cancel_relief_request,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::entities::RecordStatus,
            crate::entities::agency::AgencyType,
            crate::entities::inventory_balance::InventoryStatus,
            crate::entities::relief_package::PackageStatus,
            crate::entities::disaster_event::EventType,
            crate::entities::disaster_event::EventStatus,
            crate::entities::relief_request::Urgency,
            crate::entities::relief_request::RequestStatus,
            crate::entities::relief_request::RequestStage,
            crate::entities::relief_request_item::LineStatus,
            crate::rules::AgencyFormRule,
            handlers::warehouses::CreateWarehouseRequest,
            handlers::warehouses::UpdateWarehouseRequest,
            handlers::items::CreateItemRequest,
            handlers::items::UpdateItemRequest,
            handlers::agencies::CreateAgencyRequest,
            handlers::agencies::UpdateAgencyRequest,
            handlers::inventory::ReceiveStockRequest,
            handlers::inventory::WriteOffRequest,
            handlers::relief_packages::CreatePackageRequest,
            handlers::relief_packages::SetPackageLineRequest,
            handlers::relief_packages::PackageTransitionRequest,
            handlers::disaster_events::CreateDisasterEventRequest,
            handlers::disaster_events::CloseDisasterEventRequest,
            handlers::relief_requests::CreateReliefRequestRequest,
            handlers::relief_requests::RequestLineRequest,
            handlers::relief_requests::SetRequestLineRequest,
            handlers::relief_requests::RequestTransitionRequest,
        )
    )
)]
pub struct ApiDocV1;

/// Serves the OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_package_endpoints() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("DRIMS API"));
        assert!(json.contains("/api/v1/packages/:id/dispatch"));
        assert!(json.contains("/api/v1/agencies/form-rules"));
        assert!(json.contains("/api/v1/disaster-events/:id/close"));
        assert!(json.contains("/api/v1/relief-requests/:id/approve"));
    }
}
