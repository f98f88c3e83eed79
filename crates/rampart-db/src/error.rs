//! error types for database operations.

use thiserror::Error;

/// errors that can occur during database operations.
#[derive(Error, Debug)]
pub enum Error {
    /// record not found.
    #[error("record not found: {0}")]
    NotFound(String),

    /// record already exists.
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// invalid data provided.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// database connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// generic database error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(msg) => Error::NotFound(msg),
            sea_orm::DbErr::Conn(e) => Error::Connection(e.to_string()),
            sea_orm::DbErr::ConnectionAcquire(e) => Error::Connection(e.to_string()),
            other => Error::Database(other.to_string()),
        }
    }
}

/// result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;
