pub mod agency;
pub mod disaster_event;
pub mod inventory_balance;
pub mod inventory_reservation;
pub mod item;
pub mod relief_package;
pub mod relief_package_item;
pub mod relief_request;
pub mod relief_request_item;
pub mod warehouse;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Active/inactive flag shared by the master-data tables.
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
pub enum RecordStatus {
    #[sea_orm(string_value = "A")]
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    Active,
    #[sea_orm(string_value = "I")]
    #[serde(rename = "I")]
    #[strum(serialize = "I")]
    Inactive,
}

impl Default for RecordStatus {
    fn default() -> Self {
        RecordStatus::Active
    }
}

/// Implements [`crate::services::concurrency::Versioned`] for an entity whose
/// audit columns follow the shared naming (`id`, `version_nbr`,
/// `update_by_id`, `update_dtime`).
macro_rules! versioned_entity {
    ($label:literal) => {
        impl crate::services::concurrency::Versioned for Entity {
            const LABEL: &'static str = $label;

            fn id_column() -> Column {
                Column::Id
            }

            fn version_column() -> Column {
                Column::VersionNbr
            }

            fn update_by_column() -> Column {
                Column::UpdateById
            }

            fn update_dtime_column() -> Column {
                Column::UpdateDtime
            }
        }
    };
}

/// Stamps audit fields on insert: fresh id when unset, `version_nbr = 1`,
/// creation and update times.
macro_rules! audited_active_model {
    () => {
        #[async_trait::async_trait]
        impl ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
            where
                C: ConnectionTrait,
            {
                if insert {
                    let now = chrono::Utc::now();
                    if self.id.is_not_set() {
                        self.id = sea_orm::Set(Uuid::new_v4());
                    }
                    self.version_nbr = sea_orm::Set(1);
                    self.create_dtime = sea_orm::Set(now);
                    self.update_dtime = sea_orm::Set(now);
                    if self.update_by_id.is_not_set() {
                        self.update_by_id = self.create_by_id.clone();
                    }
                }
                Ok(self)
            }
        }
    };
}

pub(crate) use audited_active_model;
pub(crate) use versioned_entity;
