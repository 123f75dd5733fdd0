//! Optimistic concurrency guard.
//!
//! Every mutating update of a versioned row is a compare-and-swap:
//!
//! ```sql
//! UPDATE t SET ..., version_nbr = :expected + 1, update_by_id = :actor, update_dtime = :now
//!  WHERE id = :id AND version_nbr = :expected
//! ```
//!
//! Zero affected rows means someone else committed first and the caller gets
//! [`ServiceError::StaleWrite`]. On SQLite a writer racing an uncommitted
//! transaction on the same data is refused with SQLITE_BUSY instead; that is
//! the same conflict seen earlier and is reported the same way.

use crate::errors::{classify_db_error, is_lock_contention, ServiceError};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    sea_query::{Expr, SimpleExpr},
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Value,
};
use tracing::{debug, warn};
use uuid::Uuid;

/// An entity whose rows carry the shared audit and version columns.
pub trait Versioned: EntityTrait {
    /// Human-readable entity name used in conflict messages
    const LABEL: &'static str;

    fn id_column() -> Self::Column;
    fn version_column() -> Self::Column;
    fn update_by_column() -> Self::Column;
    fn update_dtime_column() -> Self::Column;
}

/// Column assignments applied by [`guarded_update`].
pub struct VersionedUpdate<E: Versioned> {
    changes: Vec<(E::Column, SimpleExpr)>,
}

impl<E: Versioned> Default for VersionedUpdate<E> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
        }
    }
}

impl<E: Versioned> VersionedUpdate<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V>(mut self, column: E::Column, value: V) -> Self
    where
        V: Into<Value>,
    {
        self.changes.push((column, Expr::value(value.into())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Applies `update` to row `id` only if it is still at `expected_version`.
///
/// Returns the new version number. Runs on whatever connection or
/// transaction the caller passes and never opens one of its own.
pub async fn guarded_update<E, C>(
    conn: &C,
    id: Uuid,
    expected_version: i32,
    actor: &str,
    update: VersionedUpdate<E>,
) -> Result<i32, ServiceError>
where
    E: Versioned,
    C: ConnectionTrait,
{
    let next_version = expected_version + 1;
    let mut statement = E::update_many()
        .col_expr(E::version_column(), Expr::value(next_version))
        .col_expr(E::update_by_column(), Expr::value(actor.to_string()))
        .col_expr(E::update_dtime_column(), Expr::value(Utc::now()));
    for (column, value) in update.changes {
        statement = statement.col_expr(column, value);
    }

    let result = statement
        .filter(E::id_column().eq(id))
        .filter(E::version_column().eq(expected_version))
        .exec(conn)
        .await
        .map_err(|err| {
            if is_lock_contention(&err) {
                counter!("drims.concurrency.stale_write", 1, "entity" => E::LABEL);
                warn!(entity = E::LABEL, id = %id, expected_version, "Lost write race");
                ServiceError::stale(E::LABEL, id, expected_version)
            } else {
                classify_db_error(err)
            }
        })?;

    if result.rows_affected == 0 {
        counter!("drims.concurrency.stale_write", 1, "entity" => E::LABEL);
        warn!(
            entity = E::LABEL,
            id = %id,
            expected_version,
            "Rejected stale write"
        );
        return Err(ServiceError::stale(E::LABEL, id, expected_version));
    }

    debug!(entity = E::LABEL, id = %id, version = next_version, "Guarded update applied");
    Ok(next_version)
}

/// Fails with `StaleWrite` when a client-supplied version no longer matches
/// the stored one. Used before multi-row operations so the conflict is
/// reported before any other write happens.
pub fn ensure_version<E: Versioned>(
    id: Uuid,
    stored_version: i32,
    expected_version: i32,
) -> Result<(), ServiceError> {
    if stored_version != expected_version {
        return Err(ServiceError::stale(E::LABEL, id, expected_version));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::warehouse;

    #[test]
    fn builder_collects_assignments() {
        let update = VersionedUpdate::<warehouse::Entity>::new()
            .set(warehouse::Column::WarehouseName, "NORTH DEPOT")
            .set(warehouse::Column::PhoneNo, Option::<String>::None);
        assert!(!update.is_empty());
        assert_eq!(update.changes.len(), 2);
    }

    #[test]
    fn version_mismatch_is_a_stale_write() {
        let id = Uuid::new_v4();
        assert!(ensure_version::<warehouse::Entity>(id, 3, 3).is_ok());
        let err = ensure_version::<warehouse::Entity>(id, 4, 3).unwrap_err();
        assert!(err.is_stale_write());
        assert!(err.to_string().contains("Warehouse"));
    }
}
