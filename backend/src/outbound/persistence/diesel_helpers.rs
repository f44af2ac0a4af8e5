//! Shared helpers for the Diesel adapters.
//!
//! Every adapter classifies pool and Diesel failures the same way, then maps
//! the classification onto its own port error.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::pool::PoolError;

/// Adapter-neutral view of a failed database call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be obtained.
    Connection(String),
    /// A unique constraint rejected the write; carries the constraint name.
    UniqueViolation(Option<String>),
    /// Any other query failure.
    Query(String),
}

/// Extract a readable message from a pool error.
pub(crate) fn classify_pool_error(error: PoolError) -> DieselFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DieselFailure::Connection(message)
        }
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify_diesel_error(error: diesel::result::Error) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            DieselFailure::Query("database query error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.constraint_name().map(str::to_owned))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        _ => DieselFailure::Query("database error".to_owned()),
    }
}

/// Cast a domain revision to the `INTEGER` column type.
#[allow(
    clippy::cast_possible_wrap,
    reason = "revision values are always small positive integers"
)]
pub(crate) fn revision_to_db(revision: u32) -> i32 {
    revision as i32
}

/// Cast an `INTEGER` revision column back to the domain type.
#[allow(
    clippy::cast_sign_loss,
    reason = "a CHECK constraint keeps revisions non-negative"
)]
pub(crate) fn revision_from_db(revision: i32) -> u32 {
    revision as u32
}

/// Serialize a domain document for a JSONB column.
pub(crate) fn encode_document<T: Serialize>(document: &T) -> Result<serde_json::Value, String> {
    serde_json::to_value(document).map_err(|err| format!("document encoding failed: {err}"))
}

/// Deserialize a JSONB column into a domain document.
pub(crate) fn decode_document<T: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<T, String> {
    serde_json::from_value(value).map_err(|err| format!("corrupted document in database: {err}"))
}
