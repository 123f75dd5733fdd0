use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A hold of `reserved_qty` units on an inventory line for one package line.
///
/// Rows exist only while the owning package holds stock; release and
/// consumption delete them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_reservations")]
#[schema(as = Reservation)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub package_item_id: Uuid,
    pub inventory_id: Uuid,
    pub reserved_qty: i64,
    pub create_by_id: String,
    pub create_dtime: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::relief_package_item::Entity",
        from = "Column::PackageItemId",
        to = "super::relief_package_item::Column::Id"
    )]
    PackageItem,
    #[sea_orm(
        belongs_to = "super::inventory_balance::Entity",
        from = "Column::InventoryId",
        to = "super::inventory_balance::Column::Id"
    )]
    InventoryLine,
}

impl Related<super::relief_package_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PackageItem.def()
    }
}

impl Related<super::inventory_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryLine.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.id.is_not_set() {
                self.id = Set(Uuid::new_v4());
            }
            self.create_dtime = Set(Utc::now());
        }
        Ok(self)
    }
}
