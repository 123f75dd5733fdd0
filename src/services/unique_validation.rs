//! Friendly uniqueness checks run before inserts and updates.
//!
//! The unique indexes remain the authority: a concurrent insert that slips
//! past these checks still fails at storage and surfaces as `Conflict`.

use crate::errors::ServiceError;
use crate::services::concurrency::Versioned;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

/// Trims and upper-cases a name or code; empty values are rejected.
pub fn normalize_code(field: &str, value: &str) -> Result<String, ServiceError> {
    let normalized = value.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(normalized)
}

/// Fails with `Conflict` when another row of `E` already uses `value` in
/// `column`. `exclude_id` skips the row being updated.
pub async fn ensure_unique<E, C>(
    conn: &C,
    column: E::Column,
    value: &str,
    exclude_id: Option<Uuid>,
    field: &str,
) -> Result<(), ServiceError>
where
    E: Versioned,
    C: ConnectionTrait,
{
    let mut query = E::find().filter(column.eq(value));
    if let Some(id) = exclude_id {
        query = query.filter(E::id_column().ne(id));
    }

    let taken = query.one(conn).await.map_err(ServiceError::db_error)?;
    if taken.is_some() {
        return Err(ServiceError::Conflict(format!(
            "{} \"{}\" is already in use",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_trimmed_and_upper_cased() {
        assert_eq!(
            normalize_code("Agency name", "  red cross north ").unwrap(),
            "RED CROSS NORTH"
        );
        assert!(normalize_code("Agency name", "   ").is_err());
    }
}
