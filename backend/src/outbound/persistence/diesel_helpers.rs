//! Shared helpers for Diesel repository implementations.
//!
//! - Error mapping from pool and Diesel failures to [`RepositoryError`]
//! - Parsing of enum columns stored as text

use std::fmt::Display;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Map pool errors to repository connection errors.
pub fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors, logging the driver detail.
pub fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::ClosedConnection => {
                RepositoryError::connection("database connection error")
            }
            DatabaseErrorKind::UniqueViolation => RepositoryError::query(format!(
                "unique constraint violated: {}",
                info.constraint_name().unwrap_or("unknown")
            )),
            DatabaseErrorKind::ForeignKeyViolation => {
                warn!(
                    constraint = info.constraint_name(),
                    "foreign key violation"
                );
                RepositoryError::query("foreign key violation")
            }
            _ => RepositoryError::query("database error"),
        },
        _ => RepositoryError::query("database error"),
    }
}

/// Parse a text column into a domain enum.
pub fn parse_column<T>(raw: &str, column: &'static str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|err| {
        warn!(column, value = raw, "unrecognised column value");
        RepositoryError::query(format!("invalid {column}: {err}"))
    })
}

/// Convert a byte count stored as `BIGINT`.
#[expect(
    clippy::cast_sign_loss,
    reason = "file sizes are never negative in the database"
)]
pub fn cast_size(size: i64) -> u64 {
    size.max(0) as u64
}

/// Convert a byte count for storage as `BIGINT`.
pub fn cast_size_for_db(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}
