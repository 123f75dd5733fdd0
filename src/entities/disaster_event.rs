use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of disaster an event records.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[sea_orm(string_value = "STORM")]
    Storm,
    #[sea_orm(string_value = "TORNADO")]
    Tornado,
    #[sea_orm(string_value = "FLOOD")]
    Flood,
    #[sea_orm(string_value = "TSUNAMI")]
    Tsunami,
    #[sea_orm(string_value = "FIRE")]
    Fire,
    #[sea_orm(string_value = "EARTHQUAKE")]
    Earthquake,
    #[sea_orm(string_value = "WAR")]
    War,
    #[sea_orm(string_value = "EPIDEMIC")]
    Epidemic,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum EventStatus {
    #[sea_orm(string_value = "A")]
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    Active,
    #[sea_orm(string_value = "C")]
    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    Closed,
}

/// A disaster that relief requests are raised against.
///
/// Closing an event stamps `closed_date` and `reason_desc`; a closed event
/// never reopens and no new requests may reference it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "disaster_events")]
#[schema(as = DisasterEvent)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub event_name: String,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub event_desc: String,
    #[sea_orm(nullable)]
    pub impact_desc: Option<String>,
    pub status_code: EventStatus,
    #[sea_orm(nullable)]
    pub closed_date: Option<NaiveDate>,
    #[sea_orm(nullable)]
    pub reason_desc: Option<String>,
    pub create_by_id: String,
    pub create_dtime: DateTime<Utc>,
    pub update_by_id: String,
    pub update_dtime: DateTime<Utc>,
    pub version_nbr: i32,
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status_code == EventStatus::Active
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::relief_request::Entity")]
    Requests,
}

impl Related<super::relief_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

super::audited_active_model!();
super::versioned_entity!("Disaster event");
