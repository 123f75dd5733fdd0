mod common;

use assert_matches::assert_matches;
use common::{TestApp, ACTOR};
use drims_api::entities::{agency, agency::AgencyType, RecordStatus};
use drims_api::errors::{classify_db_error, ServiceError};
use drims_api::services::agencies::{AgencyChanges, NewAgency};
use drims_api::services::warehouses::WarehouseChanges;
use rstest::rstest;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

fn new_agency(name: &str, agency_type: AgencyType, warehouse_id: Option<Uuid>) -> NewAgency {
    NewAgency {
        agency_name: name.to_string(),
        agency_type,
        warehouse_id,
        contact_name: Some("Duty Officer".to_string()),
        phone_no: None,
        email_text: None,
    }
}

#[rstest]
#[case(AgencyType::Shelter, true, "cannot be linked")]
#[case(AgencyType::Distributor, false, "must be linked")]
#[tokio::test]
async fn service_rejects_rule_violations(
    #[case] agency_type: AgencyType,
    #[case] with_warehouse: bool,
    #[case] fragment: &str,
) {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("West Depot").await;
    let warehouse_id = with_warehouse.then_some(depot.id);

    let err = app
        .state
        .services
        .agencies
        .create_agency(new_agency("Relief Group", agency_type, warehouse_id), ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains(fragment));
}

#[tokio::test]
async fn valid_combinations_are_accepted() {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("West Depot").await;

    let distributor = app
        .seed_agency("Red Valley Distributors", AgencyType::Distributor, Some(depot.id))
        .await;
    assert_eq!(distributor.warehouse_id, Some(depot.id));
    assert_eq!(distributor.agency_name, "RED VALLEY DISTRIBUTORS");
    assert_eq!(distributor.version_nbr, 1);

    let shelter = app
        .seed_agency("Hilltop Shelter", AgencyType::Shelter, None)
        .await;
    assert_eq!(shelter.warehouse_id, None);
}

#[tokio::test]
async fn changing_type_must_fix_the_warehouse_link() {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("West Depot").await;
    let distributor = app
        .seed_agency("Coastal Relief", AgencyType::Distributor, Some(depot.id))
        .await;
    let agencies = &app.state.services.agencies;
    let changes = |warehouse_id: Option<Uuid>| AgencyChanges {
        version_nbr: distributor.version_nbr,
        agency_name: distributor.agency_name.clone(),
        agency_type: AgencyType::Shelter,
        warehouse_id,
        contact_name: None,
        phone_no: None,
        email_text: None,
        status_code: RecordStatus::Active,
    };

    let err = agencies
        .update_agency(distributor.id, changes(Some(depot.id)), ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let shelter = agencies
        .update_agency(distributor.id, changes(None), ACTOR)
        .await
        .unwrap();
    assert_eq!(shelter.agency_type, AgencyType::Shelter);
    assert_eq!(shelter.warehouse_id, None);
    assert_eq!(shelter.version_nbr, 2);
}

#[tokio::test]
async fn storage_rejects_rows_that_bypass_the_service() {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("West Depot").await;

    let err = agency::ActiveModel {
        agency_name: Set("ROGUE SHELTER".to_string()),
        agency_type: Set(AgencyType::Shelter),
        warehouse_id: Set(Some(depot.id)),
        contact_name: Set(None),
        phone_no: Set(None),
        email_text: Set(None),
        status_code: Set(RecordStatus::Active),
        create_by_id: Set(ACTOR.to_string()),
        ..Default::default()
    }
    .insert(app.db())
    .await
    .unwrap_err();

    assert_matches!(classify_db_error(err), ServiceError::ConstraintViolation(_));
}

#[tokio::test]
async fn inactive_or_unknown_warehouses_cannot_be_linked() {
    let app = TestApp::new().await;
    let depot = app.seed_warehouse("Closed Depot").await;
    app.state
        .services
        .warehouses
        .update_warehouse(
            depot.id,
            WarehouseChanges {
                version_nbr: depot.version_nbr,
                warehouse_name: depot.warehouse_name.clone(),
                warehouse_type: depot.warehouse_type.clone(),
                phone_no: None,
                status_code: RecordStatus::Inactive,
            },
            ACTOR,
        )
        .await
        .unwrap();
    let agencies = &app.state.services.agencies;

    let err = agencies
        .create_agency(
            new_agency("Late Distributor", AgencyType::Distributor, Some(depot.id)),
            ACTOR,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("inactive"));

    let err = agencies
        .create_agency(
            new_agency("Ghost Distributor", AgencyType::Distributor, Some(Uuid::new_v4())),
            ACTOR,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn agency_names_are_unique() {
    let app = TestApp::new().await;
    app.seed_agency("Hilltop Shelter", AgencyType::Shelter, None).await;

    let err = app
        .state
        .services
        .agencies
        .create_agency(new_agency("  hilltop shelter ", AgencyType::Shelter, None), ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}
