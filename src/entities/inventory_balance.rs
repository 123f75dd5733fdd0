use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Availability flag of an inventory line.
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
pub enum InventoryStatus {
    #[sea_orm(string_value = "A")]
    #[serde(rename = "A")]
    #[strum(serialize = "A")]
    Available,
    #[sea_orm(string_value = "U")]
    #[serde(rename = "U")]
    #[strum(serialize = "U")]
    Unavailable,
}

/// Stock of one item held in one warehouse.
///
/// `reserved_qty` is the part of `usable_qty` held by draft or verified
/// relief packages; storage enforces `0 <= reserved_qty <= usable_qty`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "inventory_balances")]
#[schema(as = InventoryLine)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub usable_qty: i64,
    pub reserved_qty: i64,
    pub defective_qty: i64,
    pub expired_qty: i64,
    pub status_code: InventoryStatus,
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
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(has_many = "super::inventory_reservation::Entity")]
    Reservations,
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::inventory_reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl Model {
    pub fn levels(&self) -> StockLevels {
        StockLevels {
            usable: self.usable_qty,
            reserved: self.reserved_qty,
            defective: self.defective_qty,
            expired: self.expired_qty,
        }
    }

    /// Quantity that can still be reserved.
    pub fn available_qty(&self) -> i64 {
        self.levels().available()
    }
}

super::audited_active_model!();
super::versioned_entity!("Inventory line");

/// Why a stock movement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("quantity must be greater than zero, got {0}")]
    NonPositive(i64),
    #[error("requested {requested}, available {available}")]
    Insufficient { requested: i64, available: i64 },
    #[error("cannot take {requested} from a hold of {held}")]
    ExceedsHeld { requested: i64, held: i64 },
    #[error("adding {quantity} to {current} exceeds the largest storable quantity")]
    Overflow { current: i64, quantity: i64 },
}

/// Quantity arithmetic of an inventory line, independent of storage.
///
/// Every operation either returns new levels that keep
/// `0 <= reserved <= usable` or refuses without change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct StockLevels {
    pub usable: i64,
    pub reserved: i64,
    pub defective: i64,
    pub expired: i64,
}

impl StockLevels {
    pub fn new(usable: i64, reserved: i64) -> Self {
        Self {
            usable,
            reserved,
            ..Self::default()
        }
    }

    pub fn available(&self) -> i64 {
        self.usable - self.reserved
    }

    pub fn is_consistent(&self) -> bool {
        self.usable >= 0
            && self.reserved >= 0
            && self.defective >= 0
            && self.expired >= 0
            && self.reserved <= self.usable
    }

    pub fn receive(self, quantity: i64) -> Result<Self, StockError> {
        positive(quantity)?;
        Ok(Self {
            usable: checked_sum(self.usable, quantity)?,
            ..self
        })
    }

    pub fn reserve(self, quantity: i64) -> Result<Self, StockError> {
        positive(quantity)?;
        if quantity > self.available() {
            return Err(StockError::Insufficient {
                requested: quantity,
                available: self.available(),
            });
        }
        Ok(Self {
            reserved: self.reserved + quantity,
            ..self
        })
    }

    pub fn release(self, quantity: i64) -> Result<Self, StockError> {
        positive(quantity)?;
        self.held(quantity)?;
        Ok(Self {
            reserved: self.reserved - quantity,
            ..self
        })
    }

    /// Takes reserved stock out of the warehouse for good.
    pub fn consume(self, quantity: i64) -> Result<Self, StockError> {
        positive(quantity)?;
        self.held(quantity)?;
        Ok(Self {
            usable: self.usable - quantity,
            reserved: self.reserved - quantity,
            ..self
        })
    }

    /// Moves unreserved usable stock into the defective and expired counts.
    pub fn write_off(self, defective: i64, expired: i64) -> Result<Self, StockError> {
        if defective < 0 {
            return Err(StockError::NonPositive(defective));
        }
        if expired < 0 {
            return Err(StockError::NonPositive(expired));
        }
        let total = checked_sum(defective, expired)?;
        positive(total)?;
        if total > self.available() {
            return Err(StockError::Insufficient {
                requested: total,
                available: self.available(),
            });
        }
        Ok(Self {
            usable: self.usable - total,
            reserved: self.reserved,
            defective: checked_sum(self.defective, defective)?,
            expired: checked_sum(self.expired, expired)?,
        })
    }

    fn held(&self, quantity: i64) -> Result<(), StockError> {
        if quantity > self.reserved {
            return Err(StockError::ExceedsHeld {
                requested: quantity,
                held: self.reserved,
            });
        }
        Ok(())
    }
}

fn checked_sum(current: i64, quantity: i64) -> Result<i64, StockError> {
    current
        .checked_add(quantity)
        .ok_or(StockError::Overflow { current, quantity })
}

fn positive(quantity: i64) -> Result<(), StockError> {
    if quantity <= 0 {
        return Err(StockError::NonPositive(quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn reserve_beyond_available_is_refused() {
        let levels = StockLevels::new(10, 8);
        assert_matches!(
            levels.reserve(5),
            Err(StockError::Insufficient {
                requested: 5,
                available: 2
            })
        );
    }

    #[test]
    fn reserve_then_release_restores_availability() {
        let levels = StockLevels::new(20, 3);
        let held = levels.reserve(7).unwrap();
        assert_eq!(held.available(), 10);
        assert_eq!(held.release(7).unwrap(), levels);
    }

    #[test]
    fn consume_removes_stock_and_hold() {
        let levels = StockLevels::new(10, 4).consume(4).unwrap();
        assert_eq!(levels, StockLevels::new(6, 0));
    }

    #[test]
    fn write_off_cannot_touch_reserved_stock() {
        let levels = StockLevels::new(10, 8);
        assert_matches!(
            levels.write_off(2, 1),
            Err(StockError::Insufficient { .. })
        );
        let written = levels.write_off(1, 1).unwrap();
        assert_eq!(written.usable, 8);
        assert_eq!(written.defective, 1);
        assert_eq!(written.expired, 1);
        assert!(written.is_consistent());
    }

    #[test]
    fn zero_and_negative_quantities_are_refused() {
        let levels = StockLevels::new(10, 0);
        assert_matches!(levels.reserve(0), Err(StockError::NonPositive(0)));
        assert_matches!(levels.receive(-1), Err(StockError::NonPositive(-1)));
        assert_matches!(levels.write_off(0, 0), Err(StockError::NonPositive(0)));
    }

    #[test]
    fn quantities_past_i64_are_refused() {
        let levels = StockLevels::new(10, 0);
        assert_matches!(
            levels.receive(i64::MAX),
            Err(StockError::Overflow { current: 10, .. })
        );
        assert_matches!(
            levels.write_off(i64::MAX, 1),
            Err(StockError::Overflow { .. })
        );
    }
}
