mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::{date, json_body, TestApp, ACTOR};
use drims_api::entities::{
    agency::AgencyType,
    disaster_event::{self, EventStatus},
};
use drims_api::errors::ServiceError;
use drims_api::services::disaster_events::DEFAULT_CLOSE_REASON;
use sea_orm::EntityTrait;
use serde_json::json;

#[tokio::test]
async fn closing_records_date_and_reason_once() {
    let app = TestApp::new().await;
    let events = &app.state.services.disaster_events;
    let storm = app.seed_event("hurricane melissa", date(2025, 10, 28)).await;
    assert_eq!(storm.event_name, "HURRICANE MELISSA");
    assert_eq!(storm.status_code, EventStatus::Active);
    assert!(storm.closed_date.is_none());

    let closed = events
        .close_event(storm.id, 1, None, "coordinator")
        .await
        .unwrap();
    assert_eq!(closed.status_code, EventStatus::Closed);
    assert_eq!(closed.closed_date, Some(Utc::now().date_naive()));
    assert_eq!(closed.reason_desc.as_deref(), Some(DEFAULT_CLOSE_REASON));
    assert_eq!(closed.update_by_id, "coordinator");
    assert_eq!(closed.version_nbr, 2);

    let stored = disaster_event::Entity::find_by_id(storm.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, closed_with_stored_time(&closed, &stored));

    let err = events.close_event(storm.id, 2, None, ACTOR).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(msg) if msg.contains("already closed"));
}

fn closed_with_stored_time(
    returned: &disaster_event::Model,
    stored: &disaster_event::Model,
) -> disaster_event::Model {
    disaster_event::Model {
        update_dtime: stored.update_dtime,
        ..returned.clone()
    }
}

#[tokio::test]
async fn stale_close_is_a_conflict() {
    let app = TestApp::new().await;
    let flood = app.seed_event("river flood", date(2025, 6, 2)).await;
    let err = app
        .state
        .services
        .disaster_events
        .close_event(flood.id, 7, Some("Water receded".into()), ACTOR)
        .await
        .unwrap_err();
    assert!(err.is_stale_write());
}

#[tokio::test]
async fn event_names_are_unique() {
    let app = TestApp::new().await;
    app.seed_event("North Fire", date(2025, 3, 1)).await;

    let response = app
        .send(
            Method::POST,
            "/api/v1/disaster-events",
            Some(json!({
                "event_name": " north fire ",
                "event_type": "FIRE",
                "start_date": "2025-03-04",
                "event_desc": "Second report of the same fire"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_filters_by_status_newest_first() {
    let app = TestApp::new().await;
    let older = app.seed_event("Quake A", date(2024, 1, 10)).await;
    let newer = app.seed_event("Quake B", date(2025, 2, 20)).await;
    app.state
        .services
        .disaster_events
        .close_event(older.id, 1, Some("Recovery complete".into()), ACTOR)
        .await
        .unwrap();

    let all = json_body(app.send(Method::GET, "/api/v1/disaster-events", None).await).await;
    let names: Vec<&str> = all["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["QUAKE B", "QUAKE A"]);

    let active =
        json_body(app.send(Method::GET, "/api/v1/disaster-events?status=A", None).await).await;
    assert_eq!(active["data"]["total"], 1);
    assert_eq!(active["data"]["items"][0]["id"], newer.id.to_string());

    let closed =
        json_body(app.send(Method::GET, "/api/v1/disaster-events?status=C", None).await).await;
    assert_eq!(closed["data"]["items"][0]["reason_desc"], "Recovery complete");
}

#[tokio::test]
async fn close_over_http() {
    let app = TestApp::new().await;
    let created = app
        .send(
            Method::POST,
            "/api/v1/disaster-events",
            Some(json!({
                "event_name": "Coastal Tsunami",
                "event_type": "TSUNAMI",
                "start_date": "2025-09-01",
                "event_desc": "Wave reached the south coast",
                "impact_desc": "Two ports closed"
            })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status_code"], "A");

    let unknown_type = app
        .send(
            Method::POST,
            "/api/v1/disaster-events",
            Some(json!({
                "event_name": "Odd",
                "event_type": "METEOR",
                "start_date": "2025-09-01",
                "event_desc": "?"
            })),
        )
        .await;
    assert!(unknown_type.status().is_client_error());

    let anonymous = app
        .request(
            Method::POST,
            &format!("/api/v1/disaster-events/{}/close", id),
            Some(json!({ "version_nbr": 1 })),
            None,
        )
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let closed = app
        .send(
            Method::POST,
            &format!("/api/v1/disaster-events/{}/close", id),
            Some(json!({ "version_nbr": 1, "reason_desc": "Ports reopened" })),
        )
        .await;
    assert_eq!(closed.status(), StatusCode::OK);
    let body = json_body(closed).await;
    assert_eq!(body["data"]["status_code"], "C");
    assert_eq!(body["data"]["reason_desc"], "Ports reopened");

    let again = app
        .send(
            Method::POST,
            &format!("/api/v1/disaster-events/{}/close", id),
            Some(json!({ "version_nbr": 2 })),
        )
        .await;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn closed_events_take_no_new_requests() {
    let app = TestApp::new().await;
    let shelter = app
        .seed_agency("Hill Shelter", AgencyType::Shelter, None)
        .await;
    let item = app.seed_item("TARP-4M", 0).await;
    let fire = app.seed_event("Hill Fire", date(2025, 8, 1)).await;

    let linked = app
        .draft_request(shelter.id, Some(fire.id), &[(item.id, 3)])
        .await;
    assert_eq!(linked.request.event_id, Some(fire.id));

    app.state
        .services
        .disaster_events
        .close_event(fire.id, 1, None, ACTOR)
        .await
        .unwrap();

    let response = app
        .send(
            Method::POST,
            "/api/v1/relief-requests",
            Some(json!({
                "agency_id": shelter.id,
                "event_id": fire.id,
                "request_date": "2025-08-03",
                "urgency_ind": "H",
                "lines": [{ "item_id": item.id, "quantity": 5 }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("closed"));
}
