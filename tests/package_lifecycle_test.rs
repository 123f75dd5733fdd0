mod common;

use assert_matches::assert_matches;
use common::{TestApp, ACTOR};
use drims_api::entities::{inventory_reservation, relief_package::PackageStatus};
use drims_api::errors::ServiceError;
use drims_api::services::inventory::WriteOff;
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn verify_requires_at_least_one_line() {
    let app = TestApp::new().await;
    let fx = app.relief_fixture(20).await;
    let packages = &app.state.services.packages;

    let err = packages.verify(fx.package.id, 1, ACTOR).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("no items"));

    packages.set_line(fx.package.id, 1, fx.item.id, 4, ACTOR).await.unwrap();
    let verified = packages.verify(fx.package.id, 2, "supervisor").await.unwrap();
    assert_eq!(verified.status_code, PackageStatus::Verified);
    assert_eq!(verified.verify_by_id.as_deref(), Some("supervisor"));
    assert_eq!(verified.version_nbr, 3);

    // Lines are frozen once verified.
    let err = packages
        .set_line(fx.package.id, 3, fx.item.id, 6, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
}

#[tokio::test]
async fn dispatch_consumes_reserved_stock_exactly_once() {
    let app = TestApp::new().await;
    let fx = app.relief_fixture(10).await;
    let packages = &app.state.services.packages;

    packages.set_line(fx.package.id, 1, fx.item.id, 6, ACTOR).await.unwrap();
    let before = app.line(fx.warehouse.id, fx.item.id).await;
    assert_eq!((before.usable_qty, before.reserved_qty), (10, 6));

    let dispatched = packages.dispatch(fx.package.id, 2, "dispatcher").await.unwrap();
    assert_eq!(dispatched.status_code, PackageStatus::Dispatched);
    assert_eq!(dispatched.dispatch_by_id.as_deref(), Some("dispatcher"));
    assert!(dispatched.dispatch_dtime.is_some());

    let after = app.line(fx.warehouse.id, fx.item.id).await;
    assert_eq!((after.usable_qty, after.reserved_qty), (4, 0));
    let holds = inventory_reservation::Entity::find()
        .count(app.db())
        .await
        .unwrap();
    assert_eq!(holds, 0);

    // A replay with the new version is refused by the state machine and
    // takes nothing more.
    let err = packages
        .dispatch(fx.package.id, dispatched.version_nbr, "dispatcher")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
    let err = packages
        .cancel(fx.package.id, dispatched.version_nbr, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
    assert_eq!(app.line(fx.warehouse.id, fx.item.id).await.usable_qty, 4);
}

#[tokio::test]
async fn dispatch_with_a_stale_version_changes_nothing() {
    let app = TestApp::new().await;
    let fx = app.relief_fixture(10).await;
    let packages = &app.state.services.packages;
    packages.set_line(fx.package.id, 1, fx.item.id, 3, ACTOR).await.unwrap();

    let err = packages.dispatch(fx.package.id, 1, ACTOR).await.unwrap_err();
    assert!(err.is_stale_write());

    let line = app.line(fx.warehouse.id, fx.item.id).await;
    assert_eq!((line.usable_qty, line.reserved_qty), (10, 3));
    let detail = packages.get_package(fx.package.id).await.unwrap();
    assert_eq!(detail.package.status_code, PackageStatus::Draft);
}

#[tokio::test]
async fn cancel_releases_every_reservation() {
    let app = TestApp::new().await;
    let fx = app.relief_fixture(12).await;
    let blankets = app.seed_item("BLNKT-WOOL", 0).await;
    app.receive(fx.warehouse.id, blankets.id, 5).await;
    let packages = &app.state.services.packages;

    packages.set_line(fx.package.id, 1, fx.item.id, 8, ACTOR).await.unwrap();
    packages.set_line(fx.package.id, 2, blankets.id, 5, ACTOR).await.unwrap();
    let verified = packages.verify(fx.package.id, 3, ACTOR).await.unwrap();

    let cancelled = packages
        .cancel(fx.package.id, verified.version_nbr, ACTOR)
        .await
        .unwrap();
    assert_eq!(cancelled.status_code, PackageStatus::Cancelled);

    let water = app.line(fx.warehouse.id, fx.item.id).await;
    assert_eq!((water.usable_qty, water.reserved_qty), (12, 0));
    let wool = app.line(fx.warehouse.id, blankets.id).await;
    assert_eq!((wool.usable_qty, wool.reserved_qty), (5, 0));

    let detail = packages.get_package(fx.package.id).await.unwrap();
    assert!(detail.lines.iter().all(|line| line.reservation.is_none()));

    let err = packages
        .dispatch(fx.package.id, cancelled.version_nbr, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
}

#[tokio::test]
async fn write_off_cannot_touch_reserved_stock() {
    let app = TestApp::new().await;
    let fx = app.relief_fixture(10).await;
    app.state
        .services
        .packages
        .set_line(fx.package.id, 1, fx.item.id, 8, ACTOR)
        .await
        .unwrap();
    let line = app.line(fx.warehouse.id, fx.item.id).await;
    let inventory = &app.state.services.inventory;

    let err = inventory
        .write_off(
            line.id,
            WriteOff {
                version_nbr: line.version_nbr,
                defective_qty: 3,
                expired_qty: 0,
            },
            ACTOR,
        )
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientStock {
            requested: 3,
            available: 2,
            ..
        }
    );

    let written = inventory
        .write_off(
            line.id,
            WriteOff {
                version_nbr: line.version_nbr,
                defective_qty: 1,
                expired_qty: 1,
            },
            ACTOR,
        )
        .await
        .unwrap();
    assert_eq!(written.usable_qty, 8);
    assert_eq!(written.reserved_qty, 8);
    assert_eq!(written.defective_qty, 1);
    assert_eq!(written.expired_qty, 1);
}

#[tokio::test]
async fn packages_need_active_parties() {
    let app = TestApp::new().await;
    let fx = app.relief_fixture(0).await;
    let packages = &app.state.services.packages;

    let err = packages
        .set_line(fx.package.id, 1, fx.item.id, 0, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = packages
        .set_line(fx.package.id, 1, uuid::Uuid::new_v4(), 1, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = packages
        .set_line(fx.package.id, 1, fx.item.id, 1, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientStock {
            requested: 1,
            available: 0,
            ..
        }
    );
}
