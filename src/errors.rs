use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::{DbErr, RuntimeErr, SqlErr};
use sea_orm::sqlx;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    #[schema(example = "Conflict")]
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "req-abc123xyz")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Insufficient stock of item {item_id} in warehouse {warehouse_id}: requested {requested}, available {available}")]
    InsufficientStock {
        warehouse_id: Uuid,
        item_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Stale write on {entity} {id}: expected version {expected_version}")]
    StaleWrite {
        entity: &'static str,
        id: Uuid,
        expected_version: i32,
    },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

/// SQLite primary result codes for SQLITE_BUSY and SQLITE_LOCKED.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Whether a write lost a lock race to a concurrent transaction.
///
/// On SQLite the loser of two deferred write transactions gets SQLITE_BUSY
/// (or an extended variant such as BUSY_SNAPSHOT) when upgrading its lock.
/// PostgreSQL reports serialization, deadlock and lock-not-available states.
pub fn is_lock_contention(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Exec(e) | DbErr::Query(e) | DbErr::Conn(e) => e,
        DbErr::Custom(text) => return mentions_locked_database(text),
        _ => return false,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => {
            let code = db.code();
            let code = code.as_deref().unwrap_or_default();
            if db.try_downcast_ref::<sqlx::sqlite::SqliteError>().is_some() {
                code.parse::<i32>()
                    .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
                    .unwrap_or_else(|_| mentions_locked_database(db.message()))
            } else {
                matches!(code, "40001" | "40P01" | "55P03")
            }
        }
        RuntimeErr::Internal(text) => mentions_locked_database(text),
        _ => false,
    }
}

fn mentions_locked_database(text: &str) -> bool {
    let text = text.to_ascii_lowercase();
    text.contains("database is locked") || text.contains("database table is locked")
}

/// Classifies a database error raised by a write.
///
/// Unique-index failures become `Conflict`; foreign-key and CHECK failures
/// become `ConstraintViolation`. Losing a lock race to a concurrent writer
/// is a `Conflict` as well. Everything else stays a `DatabaseError`.
pub fn classify_db_error(err: DbErr) -> ServiceError {
    if is_lock_contention(&err) {
        warn!(error = %err, "Write lost a lock race to a concurrent transaction");
        return ServiceError::Conflict(
            "Another update is in progress; refresh and try again".to_string(),
        );
    }

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            return ServiceError::Conflict(format!("Duplicate value: {}", msg));
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            error!(error = %msg, "Foreign key constraint rejected write");
            return ServiceError::ConstraintViolation(msg);
        }
        _ => {}
    }

    let text = err.to_string();
    if text.to_ascii_lowercase().contains("check constraint") {
        error!(error = %text, "Check constraint rejected write");
        return ServiceError::ConstraintViolation(text);
    }

    ServiceError::DatabaseError(err)
}

impl ServiceError {
    /// Wraps a read-side database error.
    pub fn db_error(error: DbErr) -> Self {
        ServiceError::DatabaseError(error)
    }

    pub fn stale(entity: &'static str, id: Uuid, expected_version: i32) -> Self {
        ServiceError::StaleWrite {
            entity,
            id,
            expected_version,
        }
    }

    pub fn is_stale_write(&self) -> bool {
        matches!(self, ServiceError::StaleWrite { .. })
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidStatus(_) | Self::ConstraintViolation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) | Self::StaleWrite { .. } => StatusCode::CONFLICT,
            Self::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal and storage-level errors return generic messages.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            Self::ConstraintViolation(_) => "Please check your input".to_string(),
            Self::StaleWrite { entity, id, .. } => format!(
                "{} {} was modified by another user; refresh and try again",
                entity, id
            ),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}
