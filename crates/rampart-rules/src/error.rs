//! error types for rampart-rules.

use thiserror::Error;

/// errors that can occur during rule authoring operations.
#[derive(Debug, Error)]
pub enum Error {
    /// the submitted rule failed validation.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// a referenced record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// the operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// the record exists but belongs to someone else.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// the storage layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] rampart_db::Error),
}

/// result type for rampart-rules operations.
pub type Result<T> = std::result::Result<T, Error>;
