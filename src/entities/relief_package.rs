use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a relief package.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(12))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "VERIFIED")]
    Verified,
    #[sea_orm(string_value = "DISPATCHED")]
    Dispatched,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl PackageStatus {
    /// Allowed transitions. Dispatched and cancelled packages are final.
    pub fn can_transition_to(self, next: PackageStatus) -> bool {
        use PackageStatus::*;
        matches!(
            (self, next),
            (Draft, Verified)
                | (Draft, Dispatched)
                | (Verified, Dispatched)
                | (Draft, Cancelled)
                | (Verified, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PackageStatus::Dispatched | PackageStatus::Cancelled)
    }

    /// Line items can only change while the package is a draft.
    pub fn is_editable(self) -> bool {
        self == PackageStatus::Draft
    }

    /// Whether the package's reservations are still held.
    pub fn holds_stock(self) -> bool {
        !self.is_terminal()
    }
}

/// A relief package: stock from one warehouse, assembled for one agency.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "relief_packages")]
#[schema(as = ReliefPackage)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agency_id: Uuid,
    pub warehouse_id: Uuid,
    pub status_code: PackageStatus,
    #[sea_orm(nullable)]
    pub verify_by_id: Option<String>,
    #[sea_orm(nullable)]
    pub verify_dtime: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub dispatch_by_id: Option<String>,
    #[sea_orm(nullable)]
    pub dispatch_dtime: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub comments_text: Option<String>,
    pub create_by_id: String,
    pub create_dtime: DateTime<Utc>,
    pub update_by_id: String,
    pub update_dtime: DateTime<Utc>,
    pub version_nbr: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::agency::Entity",
        from = "Column::AgencyId",
        to = "super::agency::Column::Id"
    )]
    Agency,
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
    #[sea_orm(has_many = "super::relief_package_item::Entity")]
    Items,
}

impl Related<super::agency::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agency.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::relief_package_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

super::audited_active_model!();
super::versioned_entity!("Relief package");

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sea_orm::Iterable;

    #[rstest]
    #[case(PackageStatus::Draft, PackageStatus::Verified, true)]
    #[case(PackageStatus::Draft, PackageStatus::Dispatched, true)]
    #[case(PackageStatus::Verified, PackageStatus::Dispatched, true)]
    #[case(PackageStatus::Draft, PackageStatus::Cancelled, true)]
    #[case(PackageStatus::Verified, PackageStatus::Cancelled, true)]
    #[case(PackageStatus::Verified, PackageStatus::Draft, false)]
    #[case(PackageStatus::Dispatched, PackageStatus::Cancelled, false)]
    #[case(PackageStatus::Dispatched, PackageStatus::Dispatched, false)]
    #[case(PackageStatus::Cancelled, PackageStatus::Dispatched, false)]
    #[case(PackageStatus::Cancelled, PackageStatus::Draft, false)]
    fn transition_table(
        #[case] from: PackageStatus,
        #[case] to: PackageStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn terminal_states_release_nothing_further() {
        for status in PackageStatus::iter() {
            assert_eq!(status.holds_stock(), !status.is_terminal());
            if status.is_terminal() {
                assert!(PackageStatus::iter().all(|next| !status.can_transition_to(next)));
            }
        }
    }
}
