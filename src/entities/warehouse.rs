use super::RecordStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Relief warehouse: a source of stock for packages and the home of
/// distributor agencies.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "warehouses")]
#[schema(as = Warehouse)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub warehouse_name: String,
    pub warehouse_type: String,
    #[sea_orm(nullable)]
    pub phone_no: Option<String>,
    pub status_code: RecordStatus,
    pub create_by_id: String,
    pub create_dtime: DateTime<Utc>,
    pub update_by_id: String,
    pub update_dtime: DateTime<Utc>,
    pub version_nbr: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::agency::Entity")]
    Agencies,
    #[sea_orm(has_many = "super::inventory_balance::Entity")]
    InventoryLines,
}

impl Related<super::agency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agencies.def()
    }
}

impl Related<super::inventory_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLines.def()
    }
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status_code == RecordStatus::Active
    }
}

super::audited_active_model!();
super::versioned_entity!("Warehouse");
