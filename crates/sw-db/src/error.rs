//! Error types for sw-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Raw driver failure before it is attributed to a migration step (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// The migration script itself failed (D003)
    #[error("[D003] Migration script failed: {0}")]
    ScriptError(String),

    /// Creating the schema/version table or recording the version failed (D004)
    #[error("[D004] Version bookkeeping failed: {0}")]
    BookkeepingError(String),

    /// Reading the current version or default schema failed (D005)
    #[error("[D005] Version query failed: {0}")]
    QueryError(String),

    /// BEGIN / COMMIT failed (D006)
    #[error("[D006] Transaction failed: {0}")]
    TransactionError(String),

    /// Invalid version store configuration (D007)
    #[error("[D007] Invalid database configuration: {0}")]
    InvalidConfig(String),

    /// Backend not compiled in (D008)
    #[error("[D008] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Re-attribute a raw [`DbError::ExecutionError`] to the step that issued
    /// it; any other variant passes through unchanged.
    pub(crate) fn attribute(kind: fn(String) -> DbError) -> impl Fn(DbError) -> DbError {
        move |err| match err {
            DbError::ExecutionError(message) => kind(message),
            other => other,
        }
    }
}
