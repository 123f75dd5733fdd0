mod common;

use axum::http::{Method, StatusCode};
use common::{json_body, TestApp};
use drims_api::entities::agency::AgencyType;
use serde_json::json;

#[tokio::test]
async fn status_and_health_report_ok() {
    let app = TestApp::new().await;

    let status = app.request(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(status.status(), StatusCode::OK);
    let body = json_body(status).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["service"], "drims-api");

    let health = app.request(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn writes_require_an_actor() {
    let app = TestApp::new().await;
    let body = json!({ "warehouse_name": "Anon Depot", "warehouse_type": "MAIN-HUB" });

    let missing = app
        .request(Method::POST, "/api/v1/warehouses", Some(body.clone()), None)
        .await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let blank = app
        .request(Method::POST, "/api/v1/warehouses", Some(body), Some("   "))
        .await;
    assert_eq!(blank.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_then_fetch_a_warehouse() {
    let app = TestApp::new().await;

    let created = app
        .send(
            Method::POST,
            "/api/v1/warehouses",
            Some(json!({ "warehouse_name": " Kingston Depot ", "warehouse_type": "main-hub" })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = json_body(created).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["warehouse_name"], "KINGSTON DEPOT");
    assert_eq!(created["data"]["warehouse_type"], "MAIN-HUB");
    assert_eq!(created["data"]["create_by_id"], common::ACTOR);
    assert_eq!(created["data"]["version_nbr"], 1);

    let fetched = app
        .send(Method::GET, &format!("/api/v1/warehouses/{}", id), None)
        .await;
    assert_eq!(fetched.status(), StatusCode::OK);

    let listed = json_body(app.send(Method::GET, "/api/v1/warehouses?page=1&limit=5", None).await).await;
    assert_eq!(listed["data"]["total"], 1);

    let duplicate = app
        .send(
            Method::POST,
            "/api/v1/warehouses",
            Some(json!({ "warehouse_name": "KINGSTON DEPOT", "warehouse_type": "MAIN-HUB" })),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let unknown = app
        .send(
            Method::GET,
            &format!("/api/v1/warehouses/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_validation_rejects_bad_payloads() {
    let app = TestApp::new().await;

    let empty_name = app
        .send(
            Method::POST,
            "/api/v1/warehouses",
            Some(json!({ "warehouse_name": "", "warehouse_type": "MAIN-HUB" })),
        )
        .await;
    assert_eq!(empty_name.status(), StatusCode::BAD_REQUEST);

    let shelter_with_depot = app
        .send(
            Method::POST,
            "/api/v1/agencies",
            Some(json!({
                "agency_name": "Bay Shelter",
                "agency_type": "SHELTER",
                "warehouse_id": uuid::Uuid::new_v4()
            })),
        )
        .await;
    assert_eq!(shelter_with_depot.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn form_rules_describe_the_warehouse_field() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api/v1/agencies/form-rules", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let rules = body["data"].as_array().unwrap();
    let shelter = rules
        .iter()
        .find(|rule| rule["agency_type"] == "SHELTER")
        .unwrap();
    assert_eq!(shelter["warehouse_enabled"], false);
    assert_eq!(shelter["warehouse_required"], false);
    let distributor = rules
        .iter()
        .find(|rule| rule["agency_type"] == "DISTRIBUTOR")
        .unwrap();
    assert_eq!(distributor["warehouse_required"], true);
}

#[tokio::test]
async fn over_reservation_returns_unprocessable() {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("Port Depot").await;
    let kit = app.seed_item("HYG-KIT", 0).await;
    let shelter = app.seed_agency("Port Shelter", AgencyType::Shelter, None).await;

    let received = app
        .send(
            Method::POST,
            "/api/v1/inventory/receipts",
            Some(json!({ "warehouse_id": depot.id, "item_id": kit.id, "quantity": 5 })),
        )
        .await;
    assert_eq!(received.status(), StatusCode::CREATED);

    let package = json_body(
        app.send(
            Method::POST,
            "/api/v1/packages",
            Some(json!({ "agency_id": shelter.id, "warehouse_id": depot.id })),
        )
        .await,
    )
    .await;
    let package_id = package["data"]["id"].as_str().unwrap().to_string();

    let too_many = app
        .send(
            Method::PUT,
            &format!("/api/v1/packages/{}/items", package_id),
            Some(json!({ "version_nbr": 1, "item_id": kit.id, "quantity": 6 })),
        )
        .await;
    assert_eq!(too_many.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let availability = json_body(
        app.send(
            Method::GET,
            &format!(
                "/api/v1/inventory/availability?warehouse_id={}&item_id={}",
                depot.id, kit.id
            ),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(availability["data"]["available_qty"], 5);

    let fits = app
        .send(
            Method::PUT,
            &format!("/api/v1/packages/{}/items", package_id),
            Some(json!({ "version_nbr": 1, "item_id": kit.id, "quantity": 5 })),
        )
        .await;
    assert_eq!(fits.status(), StatusCode::OK);
    let detail = json_body(fits).await;
    assert_eq!(detail["data"]["lines"][0]["reservation"]["reserved_qty"], 5);

    let held = json_body(
        app.send(
            Method::GET,
            &format!("/api/v1/packages/{}/reservations", package_id),
            None,
        )
        .await,
    )
    .await;
    let held = held["data"].as_array().unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0]["reserved_qty"], 5);

    let unknown = app
        .send(
            Method::GET,
            &format!("/api/v1/packages/{}/reservations", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_security_and_request_id_headers() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/status", None, None).await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("x-frame-options"));
    assert!(headers["content-security-policy"]
        .to_str()
        .unwrap()
        .contains("nonce-"));
    assert!(!headers["x-request-id"].is_empty());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["info"]["title"], "DRIMS API");
    assert!(doc["paths"]["/api/v1/packages/:id/dispatch"].is_object());
}
