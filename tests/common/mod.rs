#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use drims_api::{
    config::AppConfig,
    db,
    entities::{
        agency,
        agency::AgencyType,
        disaster_event::{self, EventType},
        inventory_balance, item, relief_package,
        relief_request::Urgency,
        warehouse,
    },
    events::{self, EventSender},
    services::{
        agencies::NewAgency,
        disaster_events::NewDisasterEvent,
        inventory::StockReceipt,
        items::NewItem,
        relief_packages::CreatePackage,
        relief_requests::{NewReliefRequest, NewRequestLine, RequestDetail},
        warehouses::NewWarehouse,
    },
    AppState,
};
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ACTOR: &str = "test.officer";

/// Application state and router over a migrated SQLite file in a temp dir.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("drims-test.db").display()
        );

        let mut cfg = AppConfig::new(url, "127.0.0.1".into(), 18_080, "development".into());
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = drims_api::app_router(state.clone()).expect("build router");

        Self {
            router,
            state,
            _dir: dir,
            _event_task: event_task,
        }
    }

    pub fn db(&self) -> &db::DbPool {
        &self.state.db
    }

    /// Send a request; `actor` becomes the `x-user-id` header.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        actor: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header("x-user-id", actor);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("router error during test request")
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(ACTOR)).await
    }

    pub async fn seed_warehouse(&self, name: &str) -> warehouse::Model {
        self.state
            .services
            .warehouses
            .create_warehouse(
                NewWarehouse {
                    warehouse_name: name.to_string(),
                    warehouse_type: "MAIN-HUB".to_string(),
                    phone_no: None,
                },
                ACTOR,
            )
            .await
            .expect("seed warehouse")
    }

    pub async fn seed_item(&self, sku: &str, reorder_qty: i64) -> item::Model {
        self.state
            .services
            .items
            .create_item(
                NewItem {
                    item_name: format!("Item {}", sku),
                    sku_code: sku.to_string(),
                    item_desc: None,
                    reorder_qty,
                },
                ACTOR,
            )
            .await
            .expect("seed item")
    }

    pub async fn seed_agency(
        &self,
        name: &str,
        agency_type: AgencyType,
        warehouse_id: Option<Uuid>,
    ) -> agency::Model {
        self.state
            .services
            .agencies
            .create_agency(
                NewAgency {
                    agency_name: name.to_string(),
                    agency_type,
                    warehouse_id,
                    contact_name: None,
                    phone_no: None,
                    email_text: None,
                },
                ACTOR,
            )
            .await
            .expect("seed agency")
    }

    pub async fn receive(
        &self,
        warehouse_id: Uuid,
        item_id: Uuid,
        quantity: i64,
    ) -> inventory_balance::Model {
        self.state
            .services
            .inventory
            .receive_stock(
                StockReceipt {
                    warehouse_id,
                    item_id,
                    quantity,
                },
                ACTOR,
            )
            .await
            .expect("receive stock")
    }

    pub async fn draft_package(&self, agency_id: Uuid, warehouse_id: Uuid) -> relief_package::Model {
        self.state
            .services
            .packages
            .create_package(
                CreatePackage {
                    agency_id,
                    warehouse_id,
                    comments_text: None,
                },
                ACTOR,
            )
            .await
            .expect("create draft package")
    }

    pub async fn seed_event(&self, name: &str, start_date: NaiveDate) -> disaster_event::Model {
        self.state
            .services
            .disaster_events
            .create_event(
                NewDisasterEvent {
                    event_name: name.to_string(),
                    event_type: EventType::Storm,
                    start_date,
                    event_desc: format!("{} landfall", name),
                    impact_desc: None,
                },
                ACTOR,
            )
            .await
            .expect("seed disaster event")
    }

    /// A draft request asking for `(item, quantity)` lines at medium urgency.
    pub async fn draft_request(
        &self,
        agency_id: Uuid,
        event_id: Option<Uuid>,
        lines: &[(Uuid, i64)],
    ) -> RequestDetail {
        self.state
            .services
            .requests
            .create_request(
                NewReliefRequest {
                    agency_id,
                    event_id,
                    request_date: date(2025, 10, 29),
                    urgency_ind: Urgency::Medium,
                    comments_text: None,
                    lines: lines
                        .iter()
                        .map(|&(item_id, quantity)| NewRequestLine {
                            item_id,
                            quantity,
                            urgency_ind: None,
                        })
                        .collect(),
                },
                ACTOR,
            )
            .await
            .expect("create draft request")
    }

    /// Current stored state of the `(warehouse, item)` inventory line.
    pub async fn line(&self, warehouse_id: Uuid, item_id: Uuid) -> inventory_balance::Model {
        inventory_balance::Entity::find()
            .filter(inventory_balance::Column::WarehouseId.eq(warehouse_id))
            .filter(inventory_balance::Column::ItemId.eq(item_id))
            .one(self.db())
            .await
            .expect("query inventory line")
            .expect("inventory line exists")
    }

    /// A warehouse holding `stock` units of one item, a shelter to ship to
    /// and an empty draft package between them.
    pub async fn relief_fixture(&self, stock: i64) -> ReliefFixture {
        let warehouse = self.seed_warehouse("North Depot").await;
        let item = self.seed_item("WTR-1L", 0).await;
        let shelter = self
            .seed_agency("Harbour Shelter", AgencyType::Shelter, None)
            .await;
        if stock > 0 {
            self.receive(warehouse.id, item.id, stock).await;
        }
        let package = self.draft_package(shelter.id, warehouse.id).await;
        ReliefFixture {
            warehouse,
            item,
            shelter,
            package,
        }
    }
}

pub struct ReliefFixture {
    pub warehouse: warehouse::Model,
    pub item: item::Model,
    pub shelter: agency::Model,
    pub package: relief_package::Model,
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
