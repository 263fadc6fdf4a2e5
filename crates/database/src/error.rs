use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("The database did not answer within {0:?}")]
    Timeout(Duration),

    #[error("A record with the same {0} already exists")]
    Duplicate(String),

    #[error("The database is unavailable: {0}")]
    Unavailable(String),
}

impl DbError {
    /// Maps unique-constraint violations to `Duplicate`, naming the offending column.
    pub(crate) fn from_write(err: sqlx::Error, column: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(column.to_string())
            }
            _ => DbError::QueryError(err),
        }
    }
}
