//! Error types for sw-migrate

use sw_core::{CoreError, Version};
use sw_db::DbError;
use thiserror::Error;

/// Fatal run errors. Failures tied to a migration carry its identity; the
/// underlying cause is preserved as the error source.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Reading the current version failed before anything was attempted (M001)
    #[error("[M001] Failed to read the current version")]
    Version(#[source] DbError),

    /// The source could not determine the next migration (M002)
    #[error("[M002] Failed to determine the next migration")]
    Source(#[source] CoreError),

    /// The script for a version could not be opened (M003)
    #[error("[M003] Failed to open the script for version {version}")]
    Read {
        version: Version,
        #[source]
        source: CoreError,
    },

    /// Applying a migration failed; it was rolled back (M004)
    #[error("[M004] Migration {name} (version {version}) failed")]
    Apply {
        name: String,
        version: Version,
        #[source]
        source: DbError,
    },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

impl MigrateError {
    /// Version of the migration that failed, if the failure is tied to one.
    pub fn version(&self) -> Option<Version> {
        match self {
            MigrateError::Read { version, .. } | MigrateError::Apply { version, .. } => {
                Some(*version)
            }
            MigrateError::Version(_) | MigrateError::Source(_) => None,
        }
    }
}
