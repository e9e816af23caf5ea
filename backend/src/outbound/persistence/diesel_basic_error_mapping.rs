//! Shared Diesel error mapping for the marketplace repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

/// Map common Diesel error variants into query/connection constructors.
///
/// `NotFound` and query-builder failures map to query errors; a closed
/// connection maps to a connection error.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    log_diesel_error(&error);

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Like [`map_basic_diesel_error`], but hands unique violations to
/// `unique` with the violated constraint name.
///
/// `unique` returns `None` for constraints it does not recognise; those fall
/// back to a query error.
pub fn map_diesel_error_with_unique<E, Q, C, U>(
    error: DieselError,
    query: Q,
    connection: C,
    unique: U,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
    U: FnOnce(Option<&str>) -> Option<E>,
{
    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        log_diesel_error(&error);
        return unique(info.constraint_name()).unwrap_or_else(|| query("unique constraint violated"));
    }
    map_basic_diesel_error(error, query, connection)
}
