mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use common::{json_body, TestApp, ACTOR};
use drims_api::entities::{item, warehouse, RecordStatus};
use drims_api::errors::ServiceError;
use drims_api::services::concurrency::{guarded_update, VersionedUpdate};
use drims_api::services::warehouses::WarehouseChanges;
use sea_orm::EntityTrait;
use serde_json::json;

fn rename(version_nbr: i32, name: &str) -> WarehouseChanges {
    WarehouseChanges {
        version_nbr,
        warehouse_name: name.to_string(),
        warehouse_type: "MAIN-HUB".to_string(),
        phone_no: None,
        status_code: RecordStatus::Active,
    }
}

#[tokio::test]
async fn two_updates_from_the_same_version_one_wins() {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("South Depot").await;
    assert_eq!(depot.version_nbr, 1);
    let warehouses = &app.state.services.warehouses;

    let first = warehouses
        .update_warehouse(depot.id, rename(1, "South Depot A"), "user.a")
        .await
        .expect("first writer wins");
    assert_eq!(first.version_nbr, 2);
    assert_eq!(first.warehouse_name, "SOUTH DEPOT A");
    assert_eq!(first.update_by_id, "user.a");

    let err = warehouses
        .update_warehouse(depot.id, rename(1, "South Depot B"), "user.b")
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::StaleWrite {
            entity: "Warehouse",
            expected_version: 1,
            ..
        }
    );

    let stored = warehouse::Entity::find_by_id(depot.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.warehouse_name, "SOUTH DEPOT A");
    assert_eq!(stored.version_nbr, 2);
}

#[tokio::test]
async fn guarded_update_bumps_version_by_exactly_one() {
    let app = TestApp::new().await;
    let relief_item = app.seed_item("TARP-4X6", 5).await;

    let mut version = relief_item.version_nbr;
    for qty in [10_i64, 20, 30] {
        let update = VersionedUpdate::<item::Entity>::new().set(item::Column::ReorderQty, qty);
        let next = guarded_update(app.db(), relief_item.id, version, ACTOR, update)
            .await
            .unwrap();
        assert_eq!(next, version + 1);
        version = next;
    }

    let stale = VersionedUpdate::<item::Entity>::new().set(item::Column::ReorderQty, 99_i64);
    let err = guarded_update(app.db(), relief_item.id, 1, ACTOR, stale)
        .await
        .unwrap_err();
    assert!(err.is_stale_write());

    let stored = item::Entity::find_by_id(relief_item.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.reorder_qty, 30);
    assert_eq!(stored.version_nbr, 4);
}

#[tokio::test]
async fn concurrent_package_edits_conflict() {
    let app = TestApp::new().await;
    let fx = app.relief_fixture(50).await;
    let other_item = app.seed_item("BLNKT-WOOL", 0).await;
    app.receive(fx.warehouse.id, other_item.id, 50).await;
    let packages = &app.state.services.packages;

    // Both editors loaded version 1.
    packages
        .set_line(fx.package.id, 1, fx.item.id, 5, "editor.one")
        .await
        .unwrap();
    let err = packages
        .set_line(fx.package.id, 1, other_item.id, 5, "editor.two")
        .await
        .unwrap_err();
    assert!(err.is_stale_write());

    // The losing edit reserved nothing.
    assert_eq!(app.line(fx.warehouse.id, other_item.id).await.reserved_qty, 0);
    let detail = packages.get_package(fx.package.id).await.unwrap();
    assert_eq!(detail.lines.len(), 1);
    assert_eq!(detail.package.version_nbr, 2);
}

#[tokio::test]
async fn stale_http_update_returns_conflict() {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("East Depot").await;
    let uri = format!("/api/v1/warehouses/{}", depot.id);
    let body = |name: &str| {
        json!({
            "version_nbr": 1,
            "warehouse_name": name,
            "warehouse_type": "MAIN-HUB",
            "status_code": "A"
        })
    };

    let ok = app.send(Method::PUT, &uri, Some(body("East Depot 1"))).await;
    assert_eq!(ok.status(), StatusCode::OK);
    let ok = json_body(ok).await;
    assert_eq!(ok["data"]["version_nbr"], 2);

    let conflict = app.send(Method::PUT, &uri, Some(body("East Depot 2"))).await;
    assert_eq!(conflict.status(), StatusCode::CONFLICT);
    let conflict = json_body(conflict).await;
    assert!(conflict["message"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("refresh"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_transitions_leave_exactly_one_winner() {
    let app = TestApp::new().await;
    let fx = app.relief_fixture(100).await;
    let packages = &app.state.services.packages;

    let mut dispatched = 0;
    for round in 0..5 {
        let package = app.draft_package(fx.shelter.id, fx.warehouse.id).await;
        packages
            .set_line(package.id, 1, fx.item.id, 2, ACTOR)
            .await
            .unwrap();

        let (dispatch, cancel) = tokio::join!(
            packages.dispatch(package.id, 2, "dispatcher"),
            packages.cancel(package.id, 2, "coordinator"),
        );
        match (dispatch, cancel) {
            (Ok(_), Err(err)) => {
                dispatched += 1;
                assert!(err.is_stale_write(), "round {}: {}", round, err);
            }
            (Err(err), Ok(_)) => assert!(err.is_stale_write(), "round {}: {}", round, err),
            (a, b) => panic!("round {}: expected one winner, got {:?} and {:?}", round, a, b),
        }
    }

    let line = app.line(fx.warehouse.id, fx.item.id).await;
    assert_eq!(line.reserved_qty, 0);
    assert_eq!(line.usable_qty, 100 - 2 * dispatched);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_master_data_updates_leave_exactly_one_winner() {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("Race Depot").await;
    let warehouses = &app.state.services.warehouses;

    let (a, b) = tokio::join!(
        warehouses.update_warehouse(depot.id, rename(1, "Race Depot A"), "user.a"),
        warehouses.update_warehouse(depot.id, rename(1, "Race Depot B"), "user.b"),
    );
    let (winner, loser) = match (a, b) {
        (Ok(w), Err(e)) | (Err(e), Ok(w)) => (w, e),
        (a, b) => panic!("expected one winner, got {:?} and {:?}", a, b),
    };
    assert!(loser.is_stale_write(), "{}", loser);

    let stored = warehouse::Entity::find_by_id(depot.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.version_nbr, 2);
    assert_eq!(stored.warehouse_name, winner.warehouse_name);
}
