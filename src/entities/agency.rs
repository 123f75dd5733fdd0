use super::RecordStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of relief agency.
///
/// Distributors operate out of a warehouse; shelters receive packages and
/// never hold stock themselves.
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
pub enum AgencyType {
    #[sea_orm(string_value = "DISTRIBUTOR")]
    Distributor,
    #[sea_orm(string_value = "SHELTER")]
    Shelter,
}

impl AgencyType {
    /// Whether an agency of this type must reference a warehouse. Types that
    /// do not require one must not reference any.
    pub fn requires_warehouse(self) -> bool {
        match self {
            AgencyType::Distributor => true,
            AgencyType::Shelter => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "agencies")]
#[schema(as = Agency)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub agency_name: String,
    pub agency_type: AgencyType,
    #[sea_orm(nullable)]
    pub warehouse_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub contact_name: Option<String>,
    #[sea_orm(nullable)]
    pub phone_no: Option<String>,
    #[sea_orm(nullable)]
    pub email_text: Option<String>,
    pub status_code: RecordStatus,
    pub create_by_id: String,
    pub create_dtime: DateTime<Utc>,
    pub update_by_id: String,
    pub update_dtime: DateTime<Utc>,
    pub version_nbr: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
    #[sea_orm(has_many = "super::relief_package::Entity")]
    ReliefPackages,
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::relief_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReliefPackages.def()
    }
}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status_code == RecordStatus::Active
    }
}

super::audited_active_model!();
super::versioned_entity!("Agency");

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveEnum, Iterable};

    #[test]
    fn agency_type_wire_and_storage_names_agree() {
        for kind in AgencyType::iter() {
            let stored = kind.to_value();
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(stored.clone()));
            assert_eq!(kind.to_string(), stored);
        }
    }
}
