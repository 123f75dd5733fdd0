use super::relief_request::Urgency;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fill state of a single requested item.
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
pub enum LineStatus {
    #[sea_orm(string_value = "R")]
    #[serde(rename = "R")]
    #[strum(serialize = "R")]
    Requested,
    #[sea_orm(string_value = "U")]
    #[serde(rename = "U")]
    #[strum(serialize = "U")]
    Unavailable,
    #[sea_orm(string_value = "W")]
    #[serde(rename = "W")]
    #[strum(serialize = "W")]
    WaitingAvailability,
    #[sea_orm(string_value = "D")]
    #[serde(rename = "D")]
    #[strum(serialize = "D")]
    Denied,
    #[sea_orm(string_value = "P")]
    #[serde(rename = "P")]
    #[strum(serialize = "P")]
    PartlyFilled,
    #[sea_orm(string_value = "L")]
    #[serde(rename = "L")]
    #[strum(serialize = "L")]
    LimitAllowed,
    #[sea_orm(string_value = "F")]
    #[serde(rename = "F")]
    #[strum(serialize = "F")]
    Filled,
}

/// One requested item; unique per (request, item).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "relief_request_items")]
#[schema(as = ReliefRequestItem)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub request_id: Uuid,
    pub item_id: Uuid,
    pub request_qty: i64,
    pub urgency_ind: Urgency,
    pub status_code: LineStatus,
    pub create_by_id: String,
    pub create_dtime: DateTime<Utc>,
    pub update_by_id: String,
    pub update_dtime: DateTime<Utc>,
    pub version_nbr: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::relief_request::Entity",
        from = "Column::RequestId",
        to = "super::relief_request::Column::Id"
    )]
    Request,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::relief_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

super::audited_active_model!();
super::versioned_entity!("Relief request item");
